use std::path::{Path, PathBuf};

use arcstr::ArcStr;
use derive_builder::Builder;
use v2bflow::exec::ToolCommand;
use v2bflow::stage::{SynthesisInput, SynthesisTool};


pub const QUARTUS_SH: &str = "quartus_sh";
/// The Tcl script that compiles a project and writes a VQM netlist, relative
/// to the vqm2blif checkout.
pub const WRITE_VQM_SCRIPT: &str = "SCRIPTS/q2_write_vqm.tcl";

/// Synthesizes a Quartus II project to a VQM netlist with `quartus_sh`.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[non_exhaustive]
#[builder(pattern = "owned")]
pub struct Quartus {
    /// The directory containing `quartus_sh`.
    #[builder(setter(into))]
    pub bin_dir: PathBuf,
    #[builder(setter(into))]
    pub write_vqm_script: PathBuf,
}

impl Quartus {
    pub fn builder() -> QuartusBuilder {
        QuartusBuilder::default()
    }

    /// Uses the VQM writer script shipped with the vqm2blif checkout at
    /// `vqm2blif_dir`.
    pub fn new(bin_dir: impl Into<PathBuf>, vqm2blif_dir: impl AsRef<Path>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            write_vqm_script: vqm2blif_dir.as_ref().join(WRITE_VQM_SCRIPT),
        }
    }
}

impl SynthesisTool for Quartus {
    fn name(&self) -> ArcStr {
        ArcStr::from(QUARTUS_SH)
    }

    fn command(&self, input: &SynthesisInput) -> ToolCommand {
        ToolCommand::new(self.bin_dir.join(QUARTUS_SH))
            .arg("--64bit")
            .arg("-t")
            .arg(&self.write_vqm_script)
            .arg("-project")
            .arg(&input.project_file)
            .arg("-family")
            .arg(input.device_family.as_str())
            .arg("-cdb_merge")
            .arg("-vqm_out_file")
            .arg(&input.netlist_path)
    }
}
