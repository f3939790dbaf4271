pub mod config;
mod orchestrator;
mod types;

pub use config::{JobConfig, OutputConfig, Preset, SourceConfig};
pub use orchestrator::{run_batch, run_batch_reported, run_job, run_job_reported};
pub use types::{BatchOutput, JobOutput, NoOpReporter, PipelineStage, ProgressReporter};
