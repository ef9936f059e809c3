use crate::config::{split_opts, RunConfig};
use crate::error::Result;
use crate::exec::Executor;
use crate::log::info;
use crate::stage::{invoke, LayoutInput, LayoutTool, Stage, StageOutcome};

/// Places and routes the logic-description file.
pub fn run(
    cfg: &RunConfig,
    tool: &dyn LayoutTool,
    executor: &dyn Executor,
) -> Result<StageOutcome> {
    let input = LayoutInput {
        arch_path: cfg.arch_path.clone(),
        logic_path: cfg.logic_path.clone(),
        extra_args: split_opts(&cfg.layout_opts),
    };
    let cmd = tool.command(&input);
    invoke(Stage::Layout, tool.name(), &cmd, executor)?;
    info!("{} ran successfully", tool.name());
    Ok(StageOutcome::Completed)
}
