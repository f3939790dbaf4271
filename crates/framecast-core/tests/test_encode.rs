#[allow(dead_code)]
mod common;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use approx::assert_abs_diff_eq;
use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use ndarray::Array3;
use tempfile::TempDir;

use framecast_core::encode::{
    encode_sequence, encode_sequence_with, ensure_parent_dir, EncodeConfig, EncoderConfig,
    GifWriter, InMemoryWriter, VideoWriter,
};
use framecast_core::error::{FramecastError, Result};
use framecast_core::frame::Frame;

fn solid_frames(n: usize, width: usize, height: usize) -> Vec<Frame> {
    (0..n)
        .map(|i| Frame::new(Array3::from_elem((height, width, 3), (i * 20) as u8)))
        .collect()
}

fn config(output: &Path, width: u32, height: u32, fps: f64) -> EncodeConfig {
    EncodeConfig {
        width,
        height,
        fps,
        output: output.to_path_buf(),
    }
}

/// Creates the output in `begin` and fails on frame `fail_at`.
struct FailingWriter {
    fail_at: usize,
    aborted: bool,
}

impl VideoWriter for FailingWriter {
    fn begin(&mut self, config: &EncodeConfig) -> Result<()> {
        fs::write(&config.output, b"partial")?;
        Ok(())
    }

    fn write_frame(&mut self, index: usize, _frame: &Frame) -> Result<()> {
        if index == self.fail_at {
            return Err(FramecastError::Encoding("disk full".into()));
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

// ---------------------------------------------------------------------------
// encode_sequence
// ---------------------------------------------------------------------------

#[test]
fn test_duration_is_frames_over_fps() {
    let dir = TempDir::new().unwrap();
    let frames = solid_frames(10, 64, 64);
    let mut writer = InMemoryWriter::new();

    let summary = encode_sequence(
        &frames,
        &config(&dir.path().join("out.bin"), 64, 64, 5.0),
        &mut writer,
    )
    .unwrap();

    assert_eq!(summary.frames_written, 10);
    assert_abs_diff_eq!(summary.duration_secs(), 2.0);
    assert!(writer.is_finished());
    assert!(!writer.is_aborted());
    assert_eq!(writer.frames(), &frames[..]);
    assert_eq!(writer.config().unwrap().fps, 5.0);
}

#[test]
fn test_progress_callback_counts_frames() {
    let dir = TempDir::new().unwrap();
    let frames = solid_frames(3, 4, 4);
    let mut seen = Vec::new();
    encode_sequence_with(
        &frames,
        &config(&dir.path().join("out.bin"), 4, 4, 1.0),
        &mut InMemoryWriter::new(),
        |n| seen.push(n),
    )
    .unwrap();
    assert_eq!(seen, [1, 2, 3]);
}

#[test]
fn test_invalid_fps_is_config_error() {
    let dir = TempDir::new().unwrap();
    let frames = solid_frames(2, 4, 4);
    for fps in [0.0, -3.0, f64::NAN, f64::INFINITY] {
        let err = encode_sequence(
            &frames,
            &config(&dir.path().join("out.bin"), 4, 4, fps),
            &mut InMemoryWriter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, FramecastError::Config(_)), "fps {fps}");
    }
}

#[test]
fn test_empty_input_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("movie").join("out.gif");
    let err = encode_sequence(&[], &config(&output, 4, 4, 8.0), &mut GifWriter::new()).unwrap_err();
    assert!(matches!(err, FramecastError::Config(_)));
    assert!(!output.exists());
}

#[test]
fn test_size_mismatch_is_invalid_frame() {
    let dir = TempDir::new().unwrap();
    let mut frames = solid_frames(2, 4, 4);
    frames.push(Frame::new(Array3::zeros((5, 4, 3))));
    let err = encode_sequence(
        &frames,
        &config(&dir.path().join("out.bin"), 4, 4, 8.0),
        &mut InMemoryWriter::new(),
    )
    .unwrap_err();
    assert!(matches!(err, FramecastError::InvalidFrame { index: 2, .. }));
}

#[test]
fn test_failed_encode_removes_partial_output() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.bin");
    let mut writer = FailingWriter {
        fail_at: 3,
        aborted: false,
    };
    let err = encode_sequence(&solid_frames(5, 4, 4), &config(&output, 4, 4, 8.0), &mut writer)
        .unwrap_err();
    assert!(matches!(err, FramecastError::Encoding(_)));
    assert!(writer.aborted);
    assert!(!output.exists());
}

#[test]
fn test_stale_output_is_replaced() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.gif");
    fs::write(&output, b"stale").unwrap();

    encode_sequence(&solid_frames(2, 4, 4), &config(&output, 4, 4, 8.0), &mut GifWriter::new())
        .unwrap();
    assert_ne!(fs::read(&output).unwrap(), b"stale");
}

#[test]
fn test_ensure_parent_dir_creates_nested_dirs() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("results").join("movie").join("a.mp4");
    ensure_parent_dir(&output).unwrap();
    assert!(output.parent().unwrap().is_dir());
    ensure_parent_dir(Path::new("bare.mp4")).unwrap();
}

// ---------------------------------------------------------------------------
// GIF
// ---------------------------------------------------------------------------

#[test]
fn test_gif_frames_and_delay() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("nested").join("anim.gif");
    let frames = solid_frames(10, 8, 6);

    let summary =
        encode_sequence(&frames, &config(&output, 8, 6, 5.0), &mut GifWriter::new()).unwrap();
    assert_eq!(summary.output, output);

    let decoder = GifDecoder::new(BufReader::new(File::open(&output).unwrap())).unwrap();
    let decoded = decoder.into_frames().collect_frames().unwrap();
    assert_eq!(decoded.len(), 10);
    for frame in &decoded {
        let (numer, denom) = frame.delay().numer_denom_ms();
        assert_abs_diff_eq!(numer as f64 / denom as f64, 200.0);
        assert_eq!(frame.buffer().dimensions(), (8, 6));
    }
    assert_eq!(decoded[3].buffer().get_pixel(0, 0).0[0], 60);
}

// ---------------------------------------------------------------------------
// EncoderConfig
// ---------------------------------------------------------------------------

#[test]
fn test_encoder_config_extension_and_display() {
    assert_eq!(EncoderConfig::Gif.extension(), "gif");
    assert_eq!(EncoderConfig::default().extension(), "mp4");
    assert_eq!(EncoderConfig::Gif.to_string(), "GIF");
    assert_eq!(
        EncoderConfig::default().to_string(),
        "ffmpeg (auto codec, mp4)"
    );
}
