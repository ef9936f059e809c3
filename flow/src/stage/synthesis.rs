use std::path::Path;

use crate::config::RunConfig;
use crate::error::{ConfigError, Result};
use crate::exec::Executor;
use crate::io::{self, WorkDir};
use crate::log::info;
use crate::stage::{invoke, Stage, StageOutcome, SynthesisInput, SynthesisTool};

/// Makes sure a netlist exists at `cfg.netlist_path`.
///
/// Rewrites `cfg.netlist_path` to an absolute path, anchored at the current
/// directory, whether or not synthesis runs. The netlist is regenerated
/// unless `cfg.resynthesize` is false and the file already exists; its age
/// relative to the project is not checked.
pub fn run(
    cfg: &mut RunConfig,
    tool: &dyn SynthesisTool,
    executor: &dyn Executor,
) -> Result<StageOutcome> {
    cfg.netlist_path = io::current_dir()?.join(&cfg.netlist_path);

    if !cfg.resynthesize && cfg.netlist_path.is_file() {
        info!(
            "found existing netlist {:?}, not re-synthesizing",
            cfg.netlist_path
        );
        return Ok(StageOutcome::Skipped);
    }

    let project_file = cfg
        .project_path
        .file_name()
        .ok_or_else(|| ConfigError::InvalidProject(cfg.project_path.clone()))?;
    let project_dir = cfg.project_path.parent().unwrap_or(Path::new(""));

    let input = SynthesisInput {
        project_file: project_file.into(),
        device_family: cfg.device_family.clone(),
        netlist_path: cfg.netlist_path.clone(),
    };
    let cmd = tool.command(&input);

    if project_dir.as_os_str().is_empty() {
        invoke(Stage::Synthesis, tool.name(), &cmd, executor)?;
    } else {
        // The tool resolves project-relative files against its working directory.
        let guard = WorkDir::enter(project_dir)?;
        invoke(Stage::Synthesis, tool.name(), &cmd, executor)?;
        guard.restore()?;
    }

    Ok(StageOutcome::Completed)
}
