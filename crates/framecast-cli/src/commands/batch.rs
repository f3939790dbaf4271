use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use framecast_core::io::ErrorPolicy;
use framecast_core::pipeline::{run_batch_reported, SourceConfig};

use super::progress::BarReporter;
use super::{build_job, PresetArg};
use crate::summary::{print_batch_result, print_job_summary};

#[derive(Args)]
pub struct BatchArgs {
    /// Job config file (TOML); its source must be an array directory
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Project root the layout directories are resolved against
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Override the output frame rate
    #[arg(long)]
    pub fps: Option<f64>,

    /// Stop at the first file that fails to convert
    #[arg(long)]
    pub fail_fast: bool,
}

pub fn run(args: &BatchArgs) -> Result<()> {
    let preset = args.config.is_none().then_some(PresetArg::Universal);
    let mut job = build_job(preset, args.config.as_deref(), args.root.as_deref(), args.fps)?;
    if args.fail_fast {
        if let SourceConfig::NpyDir { ref mut on_error } = job.source {
            *on_error = ErrorPolicy::Abort;
        }
    }
    print_job_summary(&job);

    let reporter = Arc::new(BarReporter::new()?);
    let batch = run_batch_reported(&job, reporter.clone())?;
    reporter.finish();

    print_batch_result(&batch);
    if batch.completed.is_empty() {
        anyhow::bail!("none of the {} input files could be converted", batch.total());
    }
    Ok(())
}
