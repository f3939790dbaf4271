use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::encode::{encode_sequence_with, EncodeConfig};
use crate::error::{FramecastError, Result};
use crate::io::{list_npy_files, load_image_dir, load_npy, load_npy_dir, ErrorPolicy, LoadReport};
use crate::normalize::Normalizer;

use super::config::{JobConfig, SourceConfig};
use super::types::{BatchOutput, JobOutput, NoOpReporter, PipelineStage, ProgressReporter};

fn load_source(source: &SourceConfig, input: &Path) -> Result<LoadReport> {
    match source {
        SourceConfig::Npy { .. } => Ok(LoadReport {
            sequence: load_npy(input)?,
            skipped: Vec::new(),
        }),
        SourceConfig::NpyDir { on_error } => load_npy_dir(input, *on_error),
        SourceConfig::Images { filter, on_error } => load_image_dir(input, filter, *on_error),
    }
}

/// Run one job (resolve, load, normalize, encode) with a progress reporter.
pub fn run_job_reported(
    config: &JobConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<JobOutput> {
    config.validate()?;

    reporter.begin_stage(PipelineStage::Resolving, None);
    let input = config.layout.resolve_input(&config.source)?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Loading, None);
    let LoadReport { sequence, skipped } = load_source(&config.source, &input)?;
    reporter.finish_stage();
    info!(
        input = %input.display(),
        frames = sequence.len(),
        sample_type = ?sequence.common_sample_type(),
        "Frames loaded"
    );

    let normalizer = Normalizer::new(config.normalize.clone());
    let (width, height) = normalizer.target_size(&sequence)?;
    reporter.begin_stage(PipelineStage::Normalizing, Some(sequence.len()));
    let frames = normalizer.normalize_sequence(&sequence)?;
    reporter.advance(frames.len());
    reporter.finish_stage();
    drop(sequence);

    let output = config.layout.output_path(
        &config.source.stem(&input),
        &config.output,
        config.encoder.extension(),
        (width, height),
    );
    let encode = EncodeConfig {
        width,
        height,
        fps: config.output.fps,
        output,
    };

    reporter.begin_stage(PipelineStage::Encoding, Some(frames.len()));
    let mut writer = config.encoder.build_writer();
    let summary = encode_sequence_with(&frames, &encode, writer.as_mut(), |done| {
        reporter.advance(done)
    })?;
    reporter.finish_stage();

    Ok(JobOutput {
        input,
        summary,
        skipped,
    })
}

/// Run one job without progress reporting.
pub fn run_job(config: &JobConfig) -> Result<JobOutput> {
    run_job_reported(config, Arc::new(NoOpReporter))
}

/// Convert every array file of the layout's array directory into its own
/// video.
///
/// The source must be [`SourceConfig::NpyDir`]. With [`ErrorPolicy::Skip`]
/// a failing file is recorded and the batch moves on; with
/// [`ErrorPolicy::Abort`] the first failure ends the batch.
pub fn run_batch_reported(
    config: &JobConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<BatchOutput> {
    let SourceConfig::NpyDir { on_error } = config.source else {
        return Err(FramecastError::config(format!(
            "batch conversion needs an array directory source, got {}",
            config.source
        )));
    };
    config.validate()?;

    let dir = config.layout.resolve_input(&config.source)?;
    let files = list_npy_files(&dir)?;
    if files.is_empty() {
        return Err(FramecastError::format(&dir, "no input files found"));
    }
    info!(dir = %dir.display(), files = files.len(), "Starting batch");

    let mut batch = BatchOutput::default();
    for file in files {
        // Listed paths carry the directory; the job resolves against it again.
        let Some(name) = file.file_name() else {
            continue;
        };
        let job = JobConfig {
            source: SourceConfig::npy(name),
            ..config.clone()
        };
        match run_job_reported(&job, reporter.clone()) {
            Ok(output) => batch.completed.push(output),
            Err(e) if on_error == ErrorPolicy::Skip => {
                warn!(file = %file.display(), error = %e, "Conversion failed, continuing");
                batch.failed.push((file, e));
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        completed = batch.completed.len(),
        failed = batch.failed.len(),
        "Batch finished"
    );
    Ok(batch)
}

/// Run a batch without progress reporting.
pub fn run_batch(config: &JobConfig) -> Result<BatchOutput> {
    run_batch_reported(config, Arc::new(NoOpReporter))
}
