use std::fmt;

use image::imageops::{self, FilterType};
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consts::{MAX_INTENSITY, MID_GRAY, RGB_CHANNEL_COUNT};
use crate::error::{FramecastError, Result};
use crate::frame::{Frame, FrameSequence, RawFrame, SampleType};

/// How raw sample values are mapped onto 0..=255.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueRange {
    /// Pick a mapping from the data: 8-bit data passes through, data in
    /// [0, 1] is scaled by 255, data in [0, 255] is rounded, anything else
    /// is rescaled from its sequence-wide min/max.
    #[default]
    Auto,
    /// Rescale from the min/max observed over the whole sequence.
    Global,
    /// Rescale each frame from its own min/max.
    PerFrame,
    /// Rescale from a configured range, clipping values outside it.
    Fixed { min: f32, max: f32 },
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "Auto"),
            Self::Global => write!(f, "Global min/max"),
            Self::PerFrame => write!(f, "Per-frame min/max"),
            Self::Fixed { min, max } => write!(f, "Fixed [{min}, {max}]"),
        }
    }
}

/// Palette applied to single-channel frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Colormap {
    #[default]
    Gray,
    Jet,
    Hot,
}

impl Colormap {
    /// Map an 8-bit intensity to RGB.
    pub fn apply(self, value: u8) -> [u8; 3] {
        let t = value as f32 / MAX_INTENSITY;
        let unit = |x: f32| (x.clamp(0.0, 1.0) * MAX_INTENSITY).round() as u8;
        match self {
            Self::Gray => [value; 3],
            Self::Jet => [
                unit(1.5 - (4.0 * t - 3.0).abs()),
                unit(1.5 - (4.0 * t - 2.0).abs()),
                unit(1.5 - (4.0 * t - 1.0).abs()),
            ],
            Self::Hot => [unit(3.0 * t), unit(3.0 * t - 1.0), unit(3.0 * t - 2.0)],
        }
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gray => write!(f, "Gray"),
            Self::Jet => write!(f, "Jet"),
            Self::Hot => write!(f, "Hot"),
        }
    }
}

/// Output resolution of the normalized frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resize {
    /// Keep the first frame's resolution; later frames are resized to it.
    #[default]
    Source,
    Exact { width: u32, height: u32 },
    /// Scale to `width`, keeping the aspect ratio.
    FitWidth { width: u32 },
    Scale { factor: f32 },
    /// Known sensor shapes get fixed targets (16x16 gray to 256x256,
    /// 96x64 RGB to 384x256); anything else fits to `width`.
    Adaptive { width: u32 },
}

impl Resize {
    /// Target (width, height) for a sequence whose first frame is
    /// `width` x `height` with `channels` channels.
    pub fn target(&self, width: u32, height: u32, channels: usize) -> Result<(u32, u32)> {
        match *self {
            Self::Source => Ok((width, height)),
            Self::Exact { width: w, height: h } => {
                if w == 0 || h == 0 {
                    return Err(FramecastError::config(format!(
                        "resize target must be non-zero, got {w}x{h}"
                    )));
                }
                Ok((w, h))
            }
            Self::FitWidth { width: w } => {
                if w == 0 {
                    return Err(FramecastError::config("fit width must be non-zero"));
                }
                let h = (height as u64 * w as u64 / width.max(1) as u64).max(1) as u32;
                Ok((w, h))
            }
            Self::Scale { factor } => {
                if !factor.is_finite() || factor <= 0.0 {
                    return Err(FramecastError::config(format!(
                        "scale factor must be positive, got {factor}"
                    )));
                }
                let scale = |v: u32| ((v as f32 * factor).round() as u32).max(1);
                Ok((scale(width), scale(height)))
            }
            Self::Adaptive { width: w } => match (width, height, channels) {
                (16, 16, 1) => Ok((256, 256)),
                (96, 64, 3) => Ok((384, 256)),
                _ => Self::FitWidth { width: w }.target(width, height, channels),
            },
        }
    }
}

impl fmt::Display for Resize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "Source size"),
            Self::Exact { width, height } => write!(f, "{width}x{height}"),
            Self::FitWidth { width } => write!(f, "Fit width {width}"),
            Self::Scale { factor } => write!(f, "Scale {factor}x"),
            Self::Adaptive { width } => write!(f, "Adaptive (fit width {width})"),
        }
    }
}

/// Resampling used when a frame does not match the target resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Nearest,
    Bilinear,
}

impl Interpolation {
    fn filter(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Bilinear => FilterType::Triangle,
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest => write!(f, "Nearest"),
            Self::Bilinear => write!(f, "Bilinear"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizeConfig {
    #[serde(default)]
    pub colormap: Colormap,
    #[serde(default)]
    pub interpolation: Interpolation,
    #[serde(default)]
    pub range: ValueRange,
    #[serde(default)]
    pub resize: Resize,
}

impl NormalizeConfig {
    pub fn validate(&self) -> Result<()> {
        if let ValueRange::Fixed { min, max } = self.range {
            if !(min.is_finite() && max.is_finite() && max > min) {
                return Err(FramecastError::config(format!(
                    "fixed value range must satisfy min < max, got [{min}, {max}]"
                )));
            }
        }
        // Parameters only; the source size is not known yet.
        self.resize.target(1, 1, 1)?;
        Ok(())
    }
}

/// A resolved value-to-intensity mapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValueMapping {
    /// Round and clip to 0..=255.
    Identity,
    /// `round((v - min) / (max - min) * 255)`, clipped.
    Linear { min: f32, max: f32 },
    /// Every sample becomes this intensity.
    Constant(u8),
}

impl ValueMapping {
    /// Linear mapping from [min, max]; an empty range maps to mid-gray.
    pub fn linear(min: f32, max: f32) -> Self {
        if max > min {
            Self::Linear { min, max }
        } else {
            Self::Constant(MID_GRAY)
        }
    }

    /// Non-finite samples map to 0.
    pub fn apply(&self, v: f32) -> u8 {
        if !v.is_finite() {
            return 0;
        }
        let scaled = match *self {
            Self::Identity => v,
            Self::Linear { min, max } => (v - min) / (max - min) * MAX_INTENSITY,
            Self::Constant(c) => return c,
        };
        scaled.round().clamp(0.0, MAX_INTENSITY) as u8
    }

    /// Mapping for `range` given the sequence's statistics.
    ///
    /// Returns `None` for [`ValueRange::PerFrame`], which is resolved per frame.
    pub fn for_sequence(range: ValueRange, seq: &FrameSequence) -> Option<Self> {
        match range {
            ValueRange::PerFrame => None,
            ValueRange::Fixed { min, max } => Some(Self::linear(min, max)),
            ValueRange::Global => Some(
                seq.value_range()
                    .map_or(Self::Identity, |(lo, hi)| Self::linear(lo, hi)),
            ),
            ValueRange::Auto => {
                if seq.common_sample_type() == Some(SampleType::U8) {
                    return Some(Self::Identity);
                }
                Some(match seq.value_range() {
                    None => Self::Identity,
                    Some((lo, hi)) if lo >= 0.0 && hi <= 1.0 => Self::Linear { min: 0.0, max: 1.0 },
                    Some((lo, hi)) if lo >= 0.0 && hi <= MAX_INTENSITY => Self::Identity,
                    Some((lo, hi)) => Self::linear(lo, hi),
                })
            }
        }
    }

    fn for_frame(frame: &RawFrame) -> Self {
        frame
            .value_range()
            .map_or(Self::Identity, |(lo, hi)| Self::linear(lo, hi))
    }
}

/// Turns raw frames into display-ready RGB frames of one common size.
#[derive(Clone, Debug, Default)]
pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }

    /// Target (width, height) for `seq`, derived from its first frame.
    pub fn target_size(&self, seq: &FrameSequence) -> Result<(u32, u32)> {
        let first = seq
            .frames
            .first()
            .ok_or_else(|| FramecastError::config("cannot normalize an empty frame sequence"))?;
        self.config
            .resize
            .target(first.width() as u32, first.height() as u32, first.channels())
    }

    /// Normalize every frame of `seq`, in order.
    pub fn normalize_sequence(&self, seq: &FrameSequence) -> Result<Vec<Frame>> {
        let target = self.target_size(seq)?;
        let mapping = ValueMapping::for_sequence(self.config.range, seq);
        debug!(?mapping, width = target.0, height = target.1, "Normalizing sequence");

        if self.config.colormap != Colormap::Gray
            && seq.frames.iter().any(|f| f.channels() != 1)
        {
            warn!(colormap = %self.config.colormap, "Colormap ignored for multi-channel frames");
        }

        seq.frames
            .iter()
            .enumerate()
            .map(|(index, raw)| self.normalize_frame(index, raw, mapping, target))
            .collect()
    }

    /// Normalize one frame. `mapping = None` rescales from the frame's own range.
    pub fn normalize_frame(
        &self,
        index: usize,
        raw: &RawFrame,
        mapping: Option<ValueMapping>,
        target: (u32, u32),
    ) -> Result<Frame> {
        let mapping = mapping.unwrap_or_else(|| ValueMapping::for_frame(raw));
        let rgb = to_rgb(index, raw, mapping, self.config.colormap)?;
        Ok(resize_frame(rgb, target, self.config.interpolation))
    }
}

fn to_rgb(index: usize, raw: &RawFrame, mapping: ValueMapping, colormap: Colormap) -> Result<Frame> {
    let (h, w, channels) = raw.data.dim();
    let src = &raw.data;
    let data = match channels {
        1 => {
            let mut out = Array3::<u8>::zeros((h, w, RGB_CHANNEL_COUNT));
            for row in 0..h {
                for col in 0..w {
                    let rgb = colormap.apply(mapping.apply(src[[row, col, 0]]));
                    for (ch, v) in rgb.into_iter().enumerate() {
                        out[[row, col, ch]] = v;
                    }
                }
            }
            out
        }
        3 | 4 => Array3::from_shape_fn((h, w, RGB_CHANNEL_COUNT), |(row, col, ch)| {
            mapping.apply(src[[row, col, ch]])
        }),
        n => {
            return Err(FramecastError::InvalidFrame {
                index,
                reason: format!("unsupported channel count {n}"),
            })
        }
    };
    Ok(Frame::new(data))
}

/// Resize to `target`, or return the frame untouched if it already matches.
pub fn resize_frame(frame: Frame, target: (u32, u32), interpolation: Interpolation) -> Frame {
    let (w, h) = target;
    if frame.width() == w as usize && frame.height() == h as usize {
        return frame;
    }
    let resized = imageops::resize(&frame.to_rgb_image(), w, h, interpolation.filter());
    Frame::from_rgb_image(&resized)
}
