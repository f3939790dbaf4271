use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_FIT_WIDTH, DEFAULT_FPS, DEFAULT_IMAGE_PREFIX, DEFAULT_OUTPUT_ARRAY,
    DEFAULT_TARGET_ARRAY,
};
use crate::encode::{EncoderConfig, FfmpegOptions, VideoCodec};
use crate::error::{FramecastError, Result};
use crate::io::{ErrorPolicy, ImageFilter};
use crate::normalize::{NormalizeConfig, Resize};
use crate::paths::Layout;

/// One conversion: where frames come from, how they are shaped, where they go.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub layout: Layout,
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
}

impl JobConfig {
    pub fn validate(&self) -> Result<()> {
        self.output.validate()?;
        self.normalize.validate()?;
        if let SourceConfig::Npy { ref file } = self.source {
            if file.as_os_str().is_empty() {
                return Err(FramecastError::config("source file must not be empty"));
            }
        }
        if let EncoderConfig::Ffmpeg(ref opts) = self.encoder {
            if opts.program.as_os_str().is_empty() {
                return Err(FramecastError::config("ffmpeg program must not be empty"));
            }
        }
        Ok(())
    }

    /// Built-in job reproducing one of the conventional conversions.
    pub fn preset(preset: Preset) -> Self {
        let square = Resize::Exact {
            width: 256,
            height: 256,
        };
        match preset {
            Preset::NpyVideo => Self {
                layout: Layout::default(),
                source: SourceConfig::npy(DEFAULT_TARGET_ARRAY),
                output: OutputConfig::default(),
                normalize: NormalizeConfig {
                    resize: square,
                    ..Default::default()
                },
                encoder: EncoderConfig::default(),
            },
            Preset::NpyGif => Self {
                layout: Layout::default(),
                source: SourceConfig::npy(DEFAULT_TARGET_ARRAY),
                output: OutputConfig {
                    fps: 30.0,
                    ..Default::default()
                },
                normalize: NormalizeConfig {
                    resize: square,
                    ..Default::default()
                },
                encoder: EncoderConfig::Gif,
            },
            Preset::NpyFfmpeg => Self {
                layout: Layout::default(),
                source: SourceConfig::npy(DEFAULT_OUTPUT_ARRAY),
                output: OutputConfig {
                    suffix: "_ffmpeg".to_string(),
                    fps: 10.0,
                    ..Default::default()
                },
                normalize: NormalizeConfig {
                    resize: square,
                    ..Default::default()
                },
                encoder: EncoderConfig::Ffmpeg(FfmpegOptions {
                    codec: Some(VideoCodec::H264),
                    ..Default::default()
                }),
            },
            Preset::Universal => Self {
                layout: Layout::default(),
                source: SourceConfig::NpyDir {
                    on_error: ErrorPolicy::Skip,
                },
                output: OutputConfig {
                    size_suffix: true,
                    ..Default::default()
                },
                normalize: NormalizeConfig {
                    resize: Resize::Adaptive {
                        width: DEFAULT_FIT_WIDTH,
                    },
                    ..Default::default()
                },
                encoder: EncoderConfig::default(),
            },
            Preset::Animation => Self {
                layout: Layout::default(),
                source: SourceConfig::Images {
                    filter: ImageFilter::with_prefix(DEFAULT_IMAGE_PREFIX),
                    on_error: ErrorPolicy::Skip,
                },
                output: OutputConfig {
                    file_name: Some("animation_256x256.mp4".to_string()),
                    fps: 30.0,
                    ..Default::default()
                },
                normalize: NormalizeConfig {
                    resize: Resize::Exact {
                        width: 128,
                        height: 256,
                    },
                    ..Default::default()
                },
                encoder: EncoderConfig::default(),
            },
        }
    }
}

/// Built-in jobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// Target array to a 256x256 video at 8 fps.
    NpyVideo,
    /// Target array to a looping 256x256 GIF at 30 fps.
    NpyGif,
    /// Output array through libx264 at 10 fps.
    NpyFfmpeg,
    /// Every array of the input directory to its own video, sized by
    /// [`Resize::Adaptive`].
    Universal,
    /// `frame_*` images to a 128x256 video at 30 fps.
    Animation,
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NpyVideo => write!(f, "npy-video"),
            Self::NpyGif => write!(f, "npy-gif"),
            Self::NpyFfmpeg => write!(f, "npy-ffmpeg"),
            Self::Universal => write!(f, "universal"),
            Self::Animation => write!(f, "animation"),
        }
    }
}

/// Where the frames of a job come from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// One array file, relative to the layout's array directory.
    Npy { file: PathBuf },
    /// Every array file of the layout's array directory, in name order.
    NpyDir {
        #[serde(default)]
        on_error: ErrorPolicy,
    },
    /// Image files of the layout's image directory, in name order.
    Images {
        #[serde(default)]
        on_error: ErrorPolicy,
        #[serde(default)]
        filter: ImageFilter,
    },
}

impl SourceConfig {
    pub fn npy(file: impl Into<PathBuf>) -> Self {
        Self::Npy { file: file.into() }
    }

    /// Base name for derived output files.
    pub fn stem(&self, input: &Path) -> String {
        let name = match self {
            Self::Npy { .. } => input.file_stem(),
            Self::NpyDir { .. } | Self::Images { .. } => input.file_name(),
        };
        name.and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| "sequence".to_string())
    }
}

impl fmt::Display for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Npy { file } => write!(f, "array {}", file.display()),
            Self::NpyDir { on_error } => write!(f, "array directory (on error: {on_error})"),
            Self::Images { filter, on_error } => match filter.prefix {
                Some(ref prefix) => write!(f, "images {prefix}* (on error: {on_error})"),
                None => write!(f, "images (on error: {on_error})"),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Fixed output file name; derived from the source when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Appended to the derived stem.
    pub suffix: String,
    /// Append `_<width>x<height>` to the derived stem.
    pub size_suffix: bool,
    pub fps: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: None,
            suffix: String::new(),
            size_suffix: false,
            fps: DEFAULT_FPS,
        }
    }
}

impl OutputConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(FramecastError::config(format!(
                "fps must be a positive number, got {}",
                self.fps
            )));
        }
        if self.file_name.as_deref().is_some_and(str::is_empty) {
            return Err(FramecastError::config("output file name must not be empty"));
        }
        Ok(())
    }
}
