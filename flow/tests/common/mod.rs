#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use lazy_static::lazy_static;
use quartus::Quartus;
use tempdir::TempDir;
use v2bflow::config::{
    resolve, Environment, FlowArgs, RunConfig, CONVERTER_DIR_VAR, LAYOUT_DIR_VAR,
    SYNTHESIS_DIR_VAR,
};
use v2bflow::exec::RecordingExecutor;
use v2bflow::flow::Flow;
use vpr::Vpr;
use vqm2blif::Vqm2Blif;

pub const V2B_DIR: &str = "/tools/v2b";
pub const QUARTUS_DIR: &str = "/tools/quartus/bin";
pub const VPR_DIR: &str = "/tools/vpr";

lazy_static! {
    /// The working directory is process-wide; tests that change it or depend
    /// on it must hold this lock.
    static ref CWD_LOCK: Mutex<()> = Mutex::new(());
}

/// A scratch directory that is also the current directory while the
/// returned guard lives.
pub struct Scratch {
    pub dir: TempDir,
    prev: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl Scratch {
    pub fn new(prefix: &str) -> Self {
        let lock = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new(prefix).unwrap();
        let prev = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        Self {
            dir,
            prev,
            _lock: lock,
        }
    }

    /// The canonical scratch path, as reported by `current_dir`.
    pub fn path(&self) -> PathBuf {
        std::fs::canonicalize(self.dir.path()).unwrap()
    }

    /// Creates `rel` (and its parents) with some placeholder contents.
    pub fn touch(&self, rel: impl AsRef<Path>) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, "placeholder\n").unwrap();
        path
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.prev);
    }
}

pub fn env() -> Environment {
    Environment::from_iter([
        (CONVERTER_DIR_VAR, V2B_DIR),
        (SYNTHESIS_DIR_VAR, QUARTUS_DIR),
        (LAYOUT_DIR_VAR, VPR_DIR),
    ])
}

pub fn resolve_args(args: FlowArgs) -> RunConfig {
    resolve(args, &env()).unwrap()
}

/// A flow wired to the real plugins and a recording executor.
pub fn setup_flow(cfg: &RunConfig, exec: Arc<RecordingExecutor>) -> Flow {
    let mut builder = Flow::builder();
    builder
        .synthesis(Quartus::new(&cfg.tool_dirs.synthesis, &cfg.tool_dirs.converter))
        .conversion(Vqm2Blif::new(&cfg.tool_dirs.converter))
        .executor(exec);
    if let Some(dir) = &cfg.tool_dirs.layout {
        builder.layout(Vpr::new(dir));
    }
    builder.build().unwrap()
}
