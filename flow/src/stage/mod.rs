//! Stage runners and the tool plugin API.
//!
//! Each stage is backed by a plugin that knows the command-line contract of
//! one external tool. Runners own everything else: deciding whether to run,
//! the working directory, logging, and turning exit statuses into errors.

use std::fmt::Display;
use std::path::PathBuf;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorSource, Result};
use crate::exec::{Executor, ToolCommand};
use crate::log::info;

pub mod conversion;
pub mod layout;
pub mod synthesis;

/// The stages of the flow, in execution order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Synthesis,
    Conversion,
    Layout,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Synthesis => write!(f, "synthesis"),
            Self::Conversion => write!(f, "conversion"),
            Self::Layout => write!(f, "layout"),
        }
    }
}

/// What a stage did during a run.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum StageOutcome {
    /// The tool ran and exited successfully.
    Completed,
    /// The stage's output already existed and was reused.
    Skipped,
    /// The stage was not requested for this run.
    NotRequested,
}

/// Inputs passed to a [`SynthesisTool`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SynthesisInput {
    /// The project file, relative to the working directory the tool runs in.
    pub project_file: PathBuf,
    /// The target device family.
    pub device_family: ArcStr,
    /// The absolute path of the netlist to write.
    pub netlist_path: PathBuf,
}

/// The trait that synthesis plugins must implement.
pub trait SynthesisTool {
    /// A short name for the tool, used in logs and errors.
    fn name(&self) -> ArcStr;
    /// Builds the command that synthesizes `input.project_file`.
    fn command(&self, input: &SynthesisInput) -> ToolCommand;
}

/// Inputs passed to a [`ConversionTool`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConversionInput {
    pub arch_path: PathBuf,
    pub netlist_path: PathBuf,
    pub logic_path: PathBuf,
    /// Extra arguments appended verbatim.
    pub extra_args: Vec<String>,
}

/// The trait that netlist-to-logic conversion plugins must implement.
pub trait ConversionTool {
    fn name(&self) -> ArcStr;
    fn command(&self, input: &ConversionInput) -> ToolCommand;
}

/// Inputs passed to a [`LayoutTool`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LayoutInput {
    pub arch_path: PathBuf,
    /// The logic-description file produced by the conversion stage.
    pub logic_path: PathBuf,
    /// Extra arguments appended verbatim.
    pub extra_args: Vec<String>,
}

/// The trait that placement and routing plugins must implement.
pub trait LayoutTool {
    fn name(&self) -> ArcStr;
    fn command(&self, input: &LayoutInput) -> ToolCommand;
}

/// Logs and runs `cmd`, failing with [`ErrorSource::StageFailed`] on a
/// non-zero exit.
pub(crate) fn invoke(
    stage: Stage,
    tool: ArcStr,
    cmd: &ToolCommand,
    executor: &dyn Executor,
) -> Result<()> {
    info!("calling {tool}");
    info!("{cmd}");
    let status = executor.execute(cmd)?;
    if !status.success() {
        return Err(ErrorSource::StageFailed {
            stage,
            tool,
            status,
        }
        .into());
    }
    Ok(())
}
