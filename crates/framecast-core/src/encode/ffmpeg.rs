use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::consts::{DEFAULT_CRF, DEFAULT_PIXEL_FORMAT, DEFAULT_X264_PRESET, FFMPEG_FRAME_PATTERN};
use crate::encode::{EncodeConfig, VideoWriter};
use crate::error::{FramecastError, Result};
use crate::frame::Frame;

/// Output container written by ffmpeg.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    #[default]
    Mp4,
    Avi,
    Mkv,
}

impl Container {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Avi => "avi",
            Self::Mkv => "mkv",
        }
    }

    /// Codecs tried in order when no codec is configured.
    ///
    /// The container never changes: the output path is fixed before the
    /// writer starts, so the last resort is mjpeg inside the same container.
    pub fn codec_preference(self) -> &'static [VideoCodec] {
        match self {
            Self::Mp4 => &[VideoCodec::H264, VideoCodec::Mpeg4, VideoCodec::Mjpeg],
            Self::Avi => &[VideoCodec::Mjpeg, VideoCodec::Mpeg4],
            Self::Mkv => &[VideoCodec::H264, VideoCodec::Mpeg4, VideoCodec::Mjpeg],
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoCodec {
    H264,
    Mpeg4,
    Mjpeg,
}

impl VideoCodec {
    /// Name of the ffmpeg encoder (`-c:v`).
    pub fn encoder_name(self) -> &'static str {
        match self {
            Self::H264 => "libx264",
            Self::Mpeg4 => "mpeg4",
            Self::Mjpeg => "mjpeg",
        }
    }

    /// Whether `-crf` and `-preset` apply.
    fn is_x264(self) -> bool {
        matches!(self, Self::H264)
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.encoder_name())
    }
}

/// Options for [`FfmpegWriter`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegOptions {
    /// ffmpeg executable, looked up on `PATH` unless absolute.
    pub program: PathBuf,
    pub container: Container,
    /// `None` picks the first codec of the container's preference list
    /// that the installed ffmpeg supports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<VideoCodec>,
    /// Constant rate factor (libx264 only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crf: Option<u8>,
    /// Speed/compression preset (libx264 only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    pub pixel_format: String,
}

impl Default for FfmpegOptions {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            container: Container::Mp4,
            codec: None,
            crf: Some(DEFAULT_CRF),
            preset: Some(DEFAULT_X264_PRESET.to_string()),
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
        }
    }
}

/// Writer that stages frames as a PNG sequence and runs ffmpeg on it.
///
/// The staging directory is removed when the writer finishes, aborts or
/// is dropped.
pub struct FfmpegWriter {
    opts: FfmpegOptions,
    staging: Option<TempDir>,
    config: Option<EncodeConfig>,
    codec: Option<VideoCodec>,
    frames_written: usize,
}

impl FfmpegWriter {
    pub fn new(opts: FfmpegOptions) -> Self {
        Self {
            opts,
            staging: None,
            config: None,
            codec: None,
            frames_written: 0,
        }
    }

    /// Codec chosen in `begin`.
    pub fn codec(&self) -> Option<VideoCodec> {
        self.codec
    }
}

impl VideoWriter for FfmpegWriter {
    fn begin(&mut self, config: &EncodeConfig) -> Result<()> {
        if !is_ffmpeg_available(&self.opts.program) {
            return Err(FramecastError::encoding(format!(
                "ffmpeg is required for {} output, but '{}' could not be run",
                self.opts.container,
                self.opts.program.display()
            )));
        }

        let codec = match self.opts.codec {
            Some(codec) => codec,
            None => probe_codec(&self.opts.program, self.opts.container)?,
        };
        let pixel_format = pixel_format_for(codec, &self.opts.pixel_format);
        let subsampled = pixel_format.starts_with("yuv420") || pixel_format.starts_with("yuvj420");
        if subsampled && (config.width % 2 != 0 || config.height % 2 != 0) {
            return Err(FramecastError::encoding(format!(
                "video size {}x{} must be even for pixel format {pixel_format}",
                config.width, config.height
            )));
        }

        let staging = tempfile::Builder::new()
            .prefix("framecast-")
            .tempdir()
            .map_err(|e| FramecastError::encoding(format!("cannot create frame staging dir: {e}")))?;
        debug!(dir = %staging.path().display(), codec = %codec, "Staging frames for ffmpeg");

        self.staging = Some(staging);
        self.config = Some(config.clone());
        self.codec = Some(codec);
        self.frames_written = 0;
        Ok(())
    }

    fn write_frame(&mut self, index: usize, frame: &Frame) -> Result<()> {
        let staging = self
            .staging
            .as_ref()
            .ok_or_else(|| FramecastError::encoding("ffmpeg writer not started"))?;
        if index != self.frames_written {
            return Err(FramecastError::encoding(format!(
                "out-of-order frame {index}, expected {}",
                self.frames_written
            )));
        }
        let path = staging.path().join(format!("frame_{index:06}.png"));
        frame
            .to_rgb_image()
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| {
                FramecastError::encoding(format!("cannot stage frame {index}: {e}"))
            })?;
        self.frames_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let staging = self
            .staging
            .take()
            .ok_or_else(|| FramecastError::encoding("ffmpeg writer not started"))?;
        let config = self
            .config
            .take()
            .ok_or_else(|| FramecastError::encoding("ffmpeg writer not started"))?;
        let codec = self
            .codec
            .ok_or_else(|| FramecastError::encoding("ffmpeg writer not started"))?;

        let pattern = staging.path().join(FFMPEG_FRAME_PATTERN);
        let args = build_args(&pattern, &config.output, config.fps, codec, &self.opts);
        info!(
            program = %self.opts.program.display(),
            frames = self.frames_written,
            codec = %codec,
            "Running ffmpeg"
        );
        debug!(?args, "ffmpeg arguments");

        let output = Command::new(&self.opts.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                FramecastError::encoding(format!(
                    "failed to spawn '{}': {e}",
                    self.opts.program.display()
                ))
            })?;

        if let Err(e) = staging.close() {
            warn!(error = %e, "Failed to remove ffmpeg staging directory");
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FramecastError::encoding(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        if !config.output.is_file() {
            return Err(FramecastError::encoding(format!(
                "ffmpeg reported success but '{}' was not written",
                config.output.display()
            )));
        }
        Ok(())
    }

    fn abort(&mut self) {
        self.staging = None;
        self.config = None;
    }
}

/// mjpeg needs full-range YUV; other codecs take the configured format.
fn pixel_format_for(codec: VideoCodec, configured: &str) -> String {
    match (codec, configured) {
        (VideoCodec::Mjpeg, "yuv420p") => "yuvj420p".to_string(),
        _ => configured.to_string(),
    }
}

/// Argument list for encoding the PNG sequence at `pattern` into `output`.
pub fn build_args(
    pattern: &Path,
    output: &Path,
    fps: f64,
    codec: VideoCodec,
    opts: &FfmpegOptions,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-loglevel", "error", "-framerate"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(fps.to_string().into());
    args.extend(["-start_number", "0", "-i"].map(OsString::from));
    args.push(pattern.as_os_str().to_owned());
    args.extend(["-c:v", codec.encoder_name(), "-pix_fmt"].map(OsString::from));
    args.push(pixel_format_for(codec, &opts.pixel_format).into());

    if codec.is_x264() {
        if let Some(crf) = opts.crf {
            args.push("-crf".into());
            args.push(crf.to_string().into());
        }
        if let Some(ref preset) = opts.preset {
            args.push("-preset".into());
            args.push(preset.into());
        }
    }

    args.push("-an".into());
    args.push(output.as_os_str().to_owned());
    args
}

/// Return `true` when `program -version` runs successfully.
pub fn is_ffmpeg_available(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// First codec of the container's preference list that ffmpeg can encode.
fn probe_codec(program: &Path, container: Container) -> Result<VideoCodec> {
    let output = Command::new(program)
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .output()
        .map_err(|e| FramecastError::encoding(format!("failed to query ffmpeg encoders: {e}")))?;
    let listing = String::from_utf8_lossy(&output.stdout);
    let available = parse_encoders(&listing);

    let preference = container.codec_preference();
    preference
        .iter()
        .copied()
        .find(|codec| available.iter().any(|name| name == codec.encoder_name()))
        .ok_or_else(|| {
            let tried: Vec<_> = preference.iter().map(|c| c.encoder_name()).collect();
            FramecastError::encoding(format!(
                "no supported video encoder for {container} (tried {})",
                tried.join(", ")
            ))
        })
}

/// Video encoder names from `ffmpeg -encoders` output.
fn parse_encoders(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let flags = parts.next()?;
            let name = parts.next()?;
            (flags.len() == 6 && flags.starts_with('V') && name != "=").then(|| name.to_string())
        })
        .collect()
}
