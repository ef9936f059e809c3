//! Sequencing of the flow's stages.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::error::{with_err_context, ErrorContext, ErrorSource, Result};
use crate::exec::{Executor, SystemExecutor};
use crate::stage::{
    conversion, layout, synthesis, ConversionTool, LayoutTool, Stage, StageOutcome,
    SynthesisTool,
};
use crate::log::{info, Log};

/// The tools and executor used to run a [`RunConfig`].
pub struct Flow {
    synthesis: Arc<dyn SynthesisTool>,
    conversion: Arc<dyn ConversionTool>,
    layout: Option<Arc<dyn LayoutTool>>,
    executor: Arc<dyn Executor>,
}

#[derive(Default)]
pub struct FlowBuilder {
    pub synthesis: Option<Arc<dyn SynthesisTool>>,
    pub conversion: Option<Arc<dyn ConversionTool>>,
    pub layout: Option<Arc<dyn LayoutTool>>,
    pub executor: Option<Arc<dyn Executor>>,
}

/// What each stage did during a successful run.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FlowReport {
    pub synthesis: StageOutcome,
    pub conversion: StageOutcome,
    pub layout: StageOutcome,
}

impl Flow {
    #[inline]
    pub fn builder() -> FlowBuilder {
        FlowBuilder::default()
    }

    /// Runs synthesis, conversion, and (if requested) layout, stopping at the
    /// first failure.
    ///
    /// `cfg.netlist_path` is made absolute by the synthesis stage.
    pub fn run(&self, cfg: &mut RunConfig) -> Result<FlowReport> {
        cfg.log();
        let executor = self.executor.as_ref();

        let synthesis = with_err_context(
            synthesis::run(cfg, self.synthesis.as_ref(), executor),
            || ErrorContext::Stage(Stage::Synthesis),
        )?;

        let conversion = with_err_context(
            conversion::run(cfg, self.conversion.as_ref(), executor),
            || ErrorContext::Stage(Stage::Conversion),
        )?;

        let layout = if cfg.run_layout {
            let tool = self
                .layout
                .as_deref()
                .ok_or(ErrorSource::ToolNotSpecified(Stage::Layout))?;
            with_err_context(layout::run(cfg, tool, executor), || {
                ErrorContext::Stage(Stage::Layout)
            })?
        } else {
            StageOutcome::NotRequested
        };

        let report = FlowReport {
            synthesis,
            conversion,
            layout,
        };
        report.log();
        Ok(report)
    }
}

impl Log for FlowReport {
    fn log(&self) {
        info!(
            "flow complete (synthesis: {:?}, conversion: {:?}, layout: {:?})",
            self.synthesis, self.conversion, self.layout
        );
    }
}

impl FlowBuilder {
    pub fn synthesis<T>(&mut self, tool: T) -> &mut Self
    where
        T: SynthesisTool + 'static,
    {
        self.synthesis = Some(Arc::new(tool));
        self
    }

    pub fn conversion<T>(&mut self, tool: T) -> &mut Self
    where
        T: ConversionTool + 'static,
    {
        self.conversion = Some(Arc::new(tool));
        self
    }

    pub fn layout<T>(&mut self, tool: T) -> &mut Self
    where
        T: LayoutTool + 'static,
    {
        self.layout = Some(Arc::new(tool));
        self
    }

    /// Defaults to a [`SystemExecutor`].
    pub fn executor(&mut self, executor: Arc<dyn Executor>) -> &mut Self {
        self.executor = Some(executor);
        self
    }

    pub fn build(&mut self) -> Result<Flow> {
        Ok(Flow {
            synthesis: self
                .synthesis
                .take()
                .ok_or(ErrorSource::ToolNotSpecified(Stage::Synthesis))?,
            conversion: self
                .conversion
                .take()
                .ok_or(ErrorSource::ToolNotSpecified(Stage::Conversion))?,
            layout: self.layout.take(),
            executor: self
                .executor
                .take()
                .unwrap_or_else(|| Arc::new(SystemExecutor) as Arc<dyn Executor>),
        })
    }
}
