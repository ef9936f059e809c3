use std::path::{Path, PathBuf};

use arcstr::ArcStr;
use derive_builder::Builder;
use v2bflow::exec::ToolCommand;
use v2bflow::stage::{ConversionInput, ConversionTool};


pub const VQM2BLIF_EXE: &str = "vqm2blif.exe";

/// Converts a VQM netlist to BLIF with `vqm2blif.exe`.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[non_exhaustive]
#[builder(pattern = "owned")]
pub struct Vqm2Blif {
    #[builder(setter(into))]
    pub exe: PathBuf,
}

impl Vqm2Blif {
    pub fn builder() -> Vqm2BlifBuilder {
        Vqm2BlifBuilder::default()
    }

    /// The executable is built one level above the checkout's base directory.
    pub fn new(vqm2blif_dir: impl AsRef<Path>) -> Self {
        Self {
            exe: vqm2blif_dir.as_ref().join("..").join(VQM2BLIF_EXE),
        }
    }
}

impl ConversionTool for Vqm2Blif {
    fn name(&self) -> ArcStr {
        ArcStr::from(VQM2BLIF_EXE)
    }

    fn command(&self, input: &ConversionInput) -> ToolCommand {
        ToolCommand::new(&self.exe)
            .arg("-arch")
            .arg(&input.arch_path)
            .arg("-vqm")
            .arg(&input.netlist_path)
            .arg("-out")
            .arg(&input.logic_path)
            .args(&input.extra_args)
    }
}
