use std::path::PathBuf;

use crate::encode::EncodeSummary;
use crate::error::FramecastError;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Resolving,
    Loading,
    Normalizing,
    Encoding,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolving => write!(f, "Resolving input"),
            Self::Loading => write!(f, "Loading frames"),
            Self::Normalizing => write!(f, "Normalizing frames"),
            Self::Encoding => write!(f, "Encoding video"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of frames in
    /// this stage, if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// `items_done` frames of the current stage are complete.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Result of one job.
#[derive(Debug)]
pub struct JobOutput {
    /// Resolved input file or directory.
    pub input: PathBuf,
    pub summary: EncodeSummary,
    /// Files skipped while loading a multi-file source.
    pub skipped: Vec<(PathBuf, FramecastError)>,
}

/// Result of a batch: one entry per input file.
#[derive(Debug, Default)]
pub struct BatchOutput {
    pub completed: Vec<JobOutput>,
    pub failed: Vec<(PathBuf, FramecastError)>,
}

impl BatchOutput {
    pub fn total(&self) -> usize {
        self.completed.len() + self.failed.len()
    }
}
