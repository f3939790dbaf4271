pub mod ffmpeg;
pub mod gif;
pub mod memory;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{FramecastError, Result};
use crate::frame::Frame;

pub use ffmpeg::{Container, FfmpegOptions, FfmpegWriter, VideoCodec};
pub use gif::GifWriter;
pub use memory::InMemoryWriter;

/// Parameters handed to a [`VideoWriter`] before the first frame.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    /// Frames per second; one frame occupies exactly `1 / fps` seconds.
    pub fps: f64,
    pub output: PathBuf,
}

impl EncodeConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(FramecastError::config(format!(
                "fps must be a positive number, got {}",
                self.fps
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(FramecastError::config(format!(
                "video size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Consumes display-ready frames in order and produces one video file.
///
/// Ordering contract: `write_frame` is called with indices 0, 1, 2, ...
/// between one `begin` and one `finish`. After a failure the caller
/// calls `abort` instead of `finish`.
pub trait VideoWriter {
    /// Open the container. Fails with an encoding error if it cannot be opened.
    fn begin(&mut self, config: &EncodeConfig) -> Result<()>;
    /// Append one frame.
    fn write_frame(&mut self, index: usize, frame: &Frame) -> Result<()>;
    /// Finalize the container.
    fn finish(&mut self) -> Result<()>;
    /// Release everything acquired by `begin` without finalizing.
    fn abort(&mut self) {}
}

/// Outcome of a completed encode.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeSummary {
    pub output: PathBuf,
    pub frames_written: usize,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

impl EncodeSummary {
    /// Playback duration in seconds (`frames / fps`).
    pub fn duration_secs(&self) -> f64 {
        self.frames_written as f64 / self.fps
    }
}

/// Scoped ownership of a writer for one encode.
///
/// Dropping the session before [`WriterSession::finish`] succeeded aborts
/// the writer and removes whatever was written to the output path.
struct WriterSession<'a, W: VideoWriter + ?Sized> {
    writer: &'a mut W,
    output: PathBuf,
    next_index: usize,
    finished: bool,
}

impl<'a, W: VideoWriter + ?Sized> WriterSession<'a, W> {
    fn open(writer: &'a mut W, config: &EncodeConfig) -> Result<Self> {
        let mut session = Self {
            writer,
            output: config.output.clone(),
            next_index: 0,
            finished: false,
        };
        session.writer.begin(config)?;
        Ok(session)
    }

    fn write(&mut self, frame: &Frame) -> Result<()> {
        self.writer.write_frame(self.next_index, frame)?;
        self.next_index += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<usize> {
        self.writer.finish()?;
        self.finished = true;
        Ok(self.next_index)
    }
}

impl<W: VideoWriter + ?Sized> Drop for WriterSession<'_, W> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.writer.abort();
        if self.output.exists() {
            match fs::remove_file(&self.output) {
                Ok(()) => debug!(output = %self.output.display(), "Removed incomplete output"),
                Err(e) => warn!(
                    output = %self.output.display(),
                    error = %e,
                    "Failed to remove incomplete output"
                ),
            }
        }
    }
}

/// Encode `frames` in order through `writer`.
///
/// Every frame must match the configured size. On failure no output file
/// is left behind.
pub fn encode_sequence<W: VideoWriter + ?Sized>(
    frames: &[Frame],
    config: &EncodeConfig,
    writer: &mut W,
) -> Result<EncodeSummary> {
    encode_sequence_with(frames, config, writer, |_| {})
}

/// Like [`encode_sequence`], calling `on_frame(n)` after the n-th frame is written.
pub fn encode_sequence_with<W, F>(
    frames: &[Frame],
    config: &EncodeConfig,
    writer: &mut W,
    mut on_frame: F,
) -> Result<EncodeSummary>
where
    W: VideoWriter + ?Sized,
    F: FnMut(usize),
{
    config.validate()?;
    if frames.is_empty() {
        return Err(FramecastError::config("no frames to encode"));
    }
    for (index, frame) in frames.iter().enumerate() {
        if frame.width() != config.width as usize || frame.height() != config.height as usize {
            return Err(FramecastError::InvalidFrame {
                index,
                reason: format!(
                    "size {}x{} does not match video size {}x{}",
                    frame.width(),
                    frame.height(),
                    config.width,
                    config.height
                ),
            });
        }
    }

    ensure_parent_dir(&config.output)?;
    remove_stale_output(&config.output)?;

    let mut session = WriterSession::open(writer, config)?;
    for frame in frames {
        session.write(frame)?;
        on_frame(session.next_index);
    }
    let frames_written = session.finish()?;

    info!(
        output = %config.output.display(),
        frames = frames_written,
        fps = config.fps,
        "Video written"
    );
    Ok(EncodeSummary {
        output: config.output.clone(),
        frames_written,
        fps: config.fps,
        width: config.width,
        height: config.height,
    })
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            FramecastError::encoding(format!(
                "failed to create output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }
    Ok(())
}

fn remove_stale_output(path: &Path) -> Result<()> {
    if path.is_file() {
        debug!(output = %path.display(), "Replacing existing output");
        fs::remove_file(path).map_err(|e| {
            FramecastError::encoding(format!(
                "failed to replace existing output '{}': {e}",
                path.display()
            ))
        })?;
    }
    Ok(())
}

/// Which encoding strategy produces the output file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncoderConfig {
    /// Animated GIF written in-process.
    Gif,
    /// PNG sequence handed to an external ffmpeg.
    Ffmpeg(FfmpegOptions),
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::Ffmpeg(FfmpegOptions::default())
    }
}

impl EncoderConfig {
    /// File extension of the produced container.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Ffmpeg(opts) => opts.container.extension(),
        }
    }

    pub fn build_writer(&self) -> Box<dyn VideoWriter> {
        match self {
            Self::Gif => Box::new(GifWriter::new()),
            Self::Ffmpeg(opts) => Box::new(FfmpegWriter::new(opts.clone())),
        }
    }
}

impl fmt::Display for EncoderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gif => write!(f, "GIF"),
            Self::Ffmpeg(opts) => match opts.codec {
                Some(codec) => write!(f, "ffmpeg ({codec}, {})", opts.container),
                None => write!(f, "ffmpeg (auto codec, {})", opts.container),
            },
        }
    }
}
