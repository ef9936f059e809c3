use std::path::PathBuf;
use std::sync::Arc;

use arcstr::ArcStr;
use clap::Parser;
use log::info;
use quartus::Quartus;
use v2bflow::config::{resolve, Environment, FlowArgs, FlowFile, RunConfig};
use v2bflow::error::Result;
use v2bflow::exec::{Executor, RecordingExecutor, SystemExecutor};
use v2bflow::flow::{Flow, FlowReport};
use vpr::Vpr;
use vqm2blif::Vqm2Blif;

const LONG_ABOUT: &str = "\
Runs the VQM2BLIF flow on the specified Quartus II project to generate a BLIF file, \
and optionally runs VPR on that file.

The Quartus II project is compiled in its own directory; by default the VQM and BLIF \
files are generated in the directory the flow is started from.";

#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = LONG_ABOUT)]
pub struct Args {
    /// The Quartus II project file of the design.
    #[arg(short = 'q', long = "quartus_project", help_heading = "Quartus options")]
    pub quartus_project: PathBuf,
    /// The device family to target [default: stratixiv].
    #[arg(short = 'f', long = "family", help_heading = "Quartus options")]
    pub family: Option<String>,
    /// If the VQM file already exists, do not re-run Quartus II to re-synthesize it.
    #[arg(long = "no_resynth", help_heading = "Quartus options")]
    pub no_resynth: bool,

    /// The output BLIF file [default: <project>_<family>.blif].
    #[arg(short = 'b', long = "blif", help_heading = "vqm2blif options")]
    pub blif: Option<PathBuf>,
    /// The output VQM file [default: <project>_<family>.vqm].
    #[arg(short = 'v', long = "vqm", help_heading = "vqm2blif options")]
    pub vqm: Option<PathBuf>,
    /// The architecture file [default: <vqm2blif dir>/BENCHMARKS/ARCH/<family>_arch.xml].
    #[arg(short = 'a', long = "arch", help_heading = "vqm2blif options")]
    pub arch: Option<PathBuf>,
    /// Additional options for vqm2blif, as a single string [default: "-luts vqm"].
    #[arg(
        long = "vqm2blif_opts",
        allow_hyphen_values = true,
        help_heading = "vqm2blif options"
    )]
    pub vqm2blif_opts: Option<String>,

    /// Run VPR on the generated BLIF file.
    #[arg(long = "vpr", help_heading = "VPR options")]
    pub vpr: bool,
    /// Additional options for VPR, as a single string.
    #[arg(long = "vpr_opts", allow_hyphen_values = true, help_heading = "VPR options")]
    pub vpr_opts: Option<String>,

    /// Override the vqm2blif directory [default: $V2B_REGRESSION_BASE_DIR].
    #[arg(long = "vqm2blif_dir", help_heading = "External tool overrides")]
    pub vqm2blif_dir: Option<PathBuf>,
    /// Override the Quartus II binary directory [default: $QII_BASE_DIR].
    #[arg(long = "quartus_dir", help_heading = "External tool overrides")]
    pub quartus_dir: Option<PathBuf>,
    /// Override the VPR directory [default: $VPR_BASE_DIR].
    #[arg(long = "vpr_dir", help_heading = "External tool overrides")]
    pub vpr_dir: Option<PathBuf>,

    /// A TOML file supplying defaults for options not given on the command line.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Log the tool invocations instead of running them.
    #[arg(long)]
    pub dry_run: bool,
    /// Print the resolved configuration as TOML and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// The options given on the command line, completed from `--config` if
    /// one was given.
    pub fn flow_args(&self) -> Result<FlowArgs> {
        let args = FlowArgs {
            project: self.quartus_project.clone(),
            device_family: self.family.as_deref().map(ArcStr::from),
            resynthesize: !self.no_resynth,
            netlist: self.vqm.clone(),
            logic: self.blif.clone(),
            arch: self.arch.clone(),
            converter_opts: self.vqm2blif_opts.clone(),
            layout_opts: self.vpr_opts.clone(),
            run_layout: self.vpr,
            converter_dir: self.vqm2blif_dir.clone(),
            synthesis_dir: self.quartus_dir.clone(),
            layout_dir: self.vpr_dir.clone(),
        };
        Ok(match &self.config {
            Some(path) => args.with_defaults_from(FlowFile::from_toml(path)?),
            None => args,
        })
    }

    pub fn resolve(&self, env: &Environment) -> Result<RunConfig> {
        resolve(self.flow_args()?, env)
    }
}

/// Wires the Quartus II, vqm2blif and VPR plugins to the directories in
/// `cfg`.
pub fn flow(cfg: &RunConfig, executor: Arc<dyn Executor>) -> Result<Flow> {
    let mut builder = Flow::builder();
    builder
        .synthesis(Quartus::new(
            &cfg.tool_dirs.synthesis,
            &cfg.tool_dirs.converter,
        ))
        .conversion(Vqm2Blif::new(&cfg.tool_dirs.converter))
        .executor(executor);
    if let Some(dir) = &cfg.tool_dirs.layout {
        builder.layout(Vpr::new(dir));
    }
    builder.build()
}

/// Resolves `args` and runs the flow with `executor`.
pub fn run(
    args: &Args,
    env: &Environment,
    executor: Arc<dyn Executor>,
) -> Result<(RunConfig, FlowReport)> {
    let mut cfg = args.resolve(env)?;
    let report = flow(&cfg, executor)?.run(&mut cfg)?;
    Ok((cfg, report))
}

/// Everything `main` does, short of mapping errors to an exit code.
pub fn run_cli(args: &Args, env: &Environment) -> Result<()> {
    if args.print_config {
        print!("{}", args.resolve(env)?.to_toml()?);
        return Ok(());
    }

    let executor: Arc<dyn Executor> = if args.dry_run {
        Arc::new(RecordingExecutor::new())
    } else {
        Arc::new(SystemExecutor)
    };
    run(args, env, executor)?;
    info!("script complete");
    Ok(())
}
