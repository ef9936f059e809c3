use std::path::PathBuf;

use arcstr::ArcStr;
use derive_builder::Builder;
use v2bflow::exec::ToolCommand;
use v2bflow::stage::{LayoutInput, LayoutTool};

#[cfg(test)]
mod tests;

pub const VPR: &str = "vpr";

/// Packs, places, and routes a BLIF circuit with VPR.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[non_exhaustive]
#[builder(pattern = "owned")]
pub struct Vpr {
    /// The directory containing the `vpr` executable.
    #[builder(setter(into))]
    pub bin_dir: PathBuf,
}

impl Vpr {
    pub fn builder() -> VprBuilder {
        VprBuilder::default()
    }

    pub fn new(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
        }
    }
}

impl LayoutTool for Vpr {
    fn name(&self) -> ArcStr {
        ArcStr::from("VPR")
    }

    /// VPR takes the circuit name without its `.blif` extension.
    fn command(&self, input: &LayoutInput) -> ToolCommand {
        ToolCommand::new(self.bin_dir.join(VPR))
            .arg(&input.arch_path)
            .arg(input.logic_path.with_extension(""))
            .args(&input.extra_args)
    }
}
