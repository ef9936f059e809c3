use std::process::ExitCode;

use clap::Parser;
use log::error;
use v2bflow::config::Environment;
use vqm2blif_flow::{run_cli, Args};

pub fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run_cli(&args, &Environment::capture()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
