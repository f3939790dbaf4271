use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use framecast_core::pipeline::run_job_reported;

use super::progress::BarReporter;
use super::{build_job, PresetArg};
use crate::summary::{print_job_result, print_job_summary};

#[derive(Args)]
pub struct RunArgs {
    /// Built-in conversion to run
    #[arg(value_enum, required_unless_present = "config", conflicts_with = "config")]
    pub preset: Option<PresetArg>,

    /// Job config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Project root the layout directories are resolved against
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Override the output frame rate
    #[arg(long)]
    pub fps: Option<f64>,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let job = build_job(
        args.preset,
        args.config.as_deref(),
        args.root.as_deref(),
        args.fps,
    )?;
    print_job_summary(&job);

    let reporter = Arc::new(BarReporter::new()?);
    let output = run_job_reported(&job, reporter.clone())?;
    reporter.finish();

    print_job_result(&output);
    Ok(())
}
