//! Optional TOML file supplying defaults for command-line options.

use std::path::{Path, PathBuf};

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::error::{with_err_context, ErrorContext, Result};
use crate::io;

/// Keys mirror the long command-line option names.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowFile {
    pub family: Option<ArcStr>,
    pub vqm: Option<PathBuf>,
    pub blif: Option<PathBuf>,
    pub arch: Option<PathBuf>,
    pub vqm2blif_opts: Option<String>,
    pub vpr_opts: Option<String>,
    pub vqm2blif_dir: Option<PathBuf>,
    pub quartus_dir: Option<PathBuf>,
    pub vpr_dir: Option<PathBuf>,
}

impl FlowFile {
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = io::read_to_string(path)?;
        with_err_context(toml::from_str(&data), || {
            ErrorContext::ReadFile(path.to_path_buf())
        })
    }
}
