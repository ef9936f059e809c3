use crate::config::{split_opts, RunConfig};
use crate::error::Result;
use crate::exec::Executor;
use crate::stage::{invoke, ConversionInput, ConversionTool, Stage, StageOutcome};

/// Converts the netlist into the logic-description file. Always runs.
///
/// A failed conversion may leave a partially written output file behind.
pub fn run(
    cfg: &RunConfig,
    tool: &dyn ConversionTool,
    executor: &dyn Executor,
) -> Result<StageOutcome> {
    let input = ConversionInput {
        arch_path: cfg.arch_path.clone(),
        netlist_path: cfg.netlist_path.clone(),
        logic_path: cfg.logic_path.clone(),
        extra_args: split_opts(&cfg.converter_opts),
    };
    let cmd = tool.command(&input);
    invoke(Stage::Conversion, tool.name(), &cmd, executor)?;
    Ok(StageOutcome::Completed)
}
