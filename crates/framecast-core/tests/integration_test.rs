#[allow(dead_code)]
mod common;

use std::fs::{self, File};
use std::io::BufReader;
use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;
use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use ndarray::Array3;
use tempfile::TempDir;

use framecast_core::encode::EncoderConfig;
use framecast_core::error::FramecastError;
use framecast_core::io::{ErrorPolicy, ImageFilter};
use framecast_core::normalize::Resize;
use framecast_core::pipeline::{
    run_batch, run_job, run_job_reported, JobConfig, OutputConfig, PipelineStage, Preset,
    ProgressReporter, SourceConfig,
};

fn gif_job(root: &std::path::Path, source: SourceConfig) -> JobConfig {
    JobConfig {
        layout: common::make_layout(root),
        source,
        output: OutputConfig {
            fps: 5.0,
            ..Default::default()
        },
        normalize: Default::default(),
        encoder: EncoderConfig::Gif,
    }
}

fn gif_frame_count(path: &std::path::Path) -> usize {
    let decoder = GifDecoder::new(BufReader::new(File::open(path).unwrap())).unwrap();
    decoder.into_frames().collect_frames().unwrap().len()
}

#[derive(Default)]
struct RecordingReporter {
    stages: Mutex<Vec<(PipelineStage, Option<usize>)>>,
    last_advance: Mutex<usize>,
}

impl ProgressReporter for RecordingReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.stages.lock().unwrap().push((stage, total_items));
    }

    fn advance(&self, items_done: usize) {
        *self.last_advance.lock().unwrap() = items_done;
    }
}

#[test]
fn test_signed_array_to_gif() {
    let dir = TempDir::new().unwrap();
    let job = gif_job(dir.path(), SourceConfig::npy("stack.npy"));
    common::write_array(
        &job.layout.npy_path().join("stack.npy"),
        &common::signed_ramp(10, 64, 64),
    );

    let output = run_job(&job).unwrap();
    let summary = &output.summary;
    assert_eq!(summary.frames_written, 10);
    assert_eq!((summary.width, summary.height), (64, 64));
    assert_abs_diff_eq!(summary.duration_secs(), 2.0);
    assert_eq!(summary.output, job.layout.movie_path().join("stack.gif"));
    assert_eq!(gif_frame_count(&summary.output), 10);
}

#[test]
fn test_reporter_sees_every_stage() {
    let dir = TempDir::new().unwrap();
    let job = gif_job(dir.path(), SourceConfig::npy("stack.npy"));
    common::write_array(
        &job.layout.npy_path().join("stack.npy"),
        &Array3::<u8>::from_elem((4, 8, 8), 9),
    );

    let reporter = Arc::new(RecordingReporter::default());
    run_job_reported(&job, reporter.clone()).unwrap();

    let stages = reporter.stages.lock().unwrap().clone();
    assert_eq!(
        stages,
        [
            (PipelineStage::Resolving, None),
            (PipelineStage::Loading, None),
            (PipelineStage::Normalizing, Some(4)),
            (PipelineStage::Encoding, Some(4)),
        ]
    );
    assert_eq!(*reporter.last_advance.lock().unwrap(), 4);
}

#[test]
fn test_missing_input_fails_before_output() {
    let dir = TempDir::new().unwrap();
    let job = gif_job(dir.path(), SourceConfig::npy("absent.npy"));
    let err = run_job(&job).unwrap_err();
    assert!(matches!(err, FramecastError::Config(_)));
    assert!(!job.layout.movie_path().exists());
}

#[test]
fn test_images_encode_in_name_order() {
    let dir = TempDir::new().unwrap();
    let mut job = gif_job(
        dir.path(),
        SourceConfig::Images {
            on_error: ErrorPolicy::Skip,
            filter: ImageFilter::default(),
        },
    );
    job.output.file_name = Some("abc.gif".into());
    let images = job.layout.images_path();
    common::write_png(&images.join("c.png"), 4, 4, [0, 0, 255]);
    common::write_png(&images.join("a.png"), 4, 4, [255, 0, 0]);
    common::write_png(&images.join("b.png"), 4, 4, [0, 255, 0]);

    let output = run_job(&job).unwrap();
    assert_eq!(output.summary.output, job.layout.movie_path().join("abc.gif"));

    let decoder =
        GifDecoder::new(BufReader::new(File::open(&output.summary.output).unwrap())).unwrap();
    let firsts: Vec<[u8; 3]> = decoder
        .into_frames()
        .collect_frames()
        .unwrap()
        .iter()
        .map(|f| {
            let p = f.buffer().get_pixel(0, 0).0;
            [p[0], p[1], p[2]]
        })
        .collect();
    assert_eq!(firsts, [[255, 0, 0], [0, 255, 0], [0, 0, 255]]);
}

#[test]
fn test_batch_converts_each_file_and_records_failures() {
    let dir = TempDir::new().unwrap();
    let mut job = gif_job(
        dir.path(),
        SourceConfig::NpyDir {
            on_error: ErrorPolicy::Skip,
        },
    );
    job.normalize.resize = Resize::FitWidth { width: 16 };
    job.output.size_suffix = true;
    let npy = job.layout.npy_path();
    common::write_array(&npy.join("run1.npy"), &common::signed_ramp(3, 4, 8));
    common::write_array(&npy.join("run2.npy"), &common::signed_ramp(5, 8, 8));
    fs::write(npy.join("run3.npy"), b"corrupt").unwrap();

    let batch = run_batch(&job).unwrap();
    assert_eq!(batch.total(), 3);
    assert_eq!(batch.completed.len(), 2);
    assert_eq!(batch.failed.len(), 1);
    assert_eq!(batch.failed[0].0, npy.join("run3.npy"));

    let movie = job.layout.movie_path();
    assert_eq!(batch.completed[0].summary.output, movie.join("run1_16x8.gif"));
    assert_eq!(batch.completed[1].summary.output, movie.join("run2_16x16.gif"));
    assert_eq!(gif_frame_count(&movie.join("run1_16x8.gif")), 3);
    assert_eq!(gif_frame_count(&movie.join("run2_16x16.gif")), 5);
    assert!(!movie.join("run3_16x16.gif").exists());
}

#[test]
fn test_batch_with_relative_root() {
    // Created below the working directory so the layout root can stay relative.
    let dir = tempfile::Builder::new()
        .prefix("framecast-batch-")
        .tempdir_in(".")
        .unwrap();
    let root = std::path::Path::new(".").join(dir.path().file_name().unwrap());
    assert!(root.is_relative());
    let job = gif_job(
        &root,
        SourceConfig::NpyDir {
            on_error: ErrorPolicy::Skip,
        },
    );
    let npy = job.layout.npy_path();
    common::write_array(&npy.join("a.npy"), &common::signed_ramp(2, 4, 4));
    common::write_array(&npy.join("b.npy"), &common::signed_ramp(3, 4, 4));

    let batch = run_batch(&job).unwrap();
    assert!(batch.failed.is_empty(), "{:?}", batch.failed);
    assert_eq!(batch.completed.len(), 2);
    assert_eq!(batch.completed[0].input, npy.join("a.npy"));
    let movie = job.layout.movie_path();
    assert_eq!(gif_frame_count(&movie.join("a.gif")), 2);
    assert_eq!(gif_frame_count(&movie.join("b.gif")), 3);
}

#[test]
fn test_batch_abort_stops_at_first_failure() {
    let dir = TempDir::new().unwrap();
    let job = gif_job(
        dir.path(),
        SourceConfig::NpyDir {
            on_error: ErrorPolicy::Abort,
        },
    );
    let npy = job.layout.npy_path();
    fs::write(npy.join("a.npy"), b"corrupt").unwrap();
    common::write_array(&npy.join("b.npy"), &common::signed_ramp(2, 4, 4));

    assert!(run_batch(&job).is_err());
    assert!(!job.layout.movie_path().join("b.gif").exists());
}

#[test]
fn test_batch_needs_directory_source() {
    let dir = TempDir::new().unwrap();
    let job = gif_job(dir.path(), SourceConfig::npy("a.npy"));
    assert!(matches!(run_batch(&job), Err(FramecastError::Config(_))));
}

#[test]
fn test_empty_batch_is_format_error() {
    let dir = TempDir::new().unwrap();
    let job = gif_job(
        dir.path(),
        SourceConfig::NpyDir {
            on_error: ErrorPolicy::Skip,
        },
    );
    assert!(matches!(run_batch(&job), Err(FramecastError::Format { .. })));
}

#[test]
fn test_gif_preset_with_custom_root() {
    let dir = TempDir::new().unwrap();
    let mut job = JobConfig::preset(Preset::NpyGif);
    job.layout = common::make_layout(dir.path());
    common::write_array(
        &job.layout.npy_path().join("tactile_target_array.npy"),
        &common::signed_ramp(3, 32, 32),
    );

    let output = run_job(&job).unwrap();
    assert_eq!((output.summary.width, output.summary.height), (256, 256));
    assert_eq!(
        output.summary.output,
        job.layout.movie_path().join("tactile_target_array.gif")
    );
    assert_eq!(gif_frame_count(&output.summary.output), 3);
}
