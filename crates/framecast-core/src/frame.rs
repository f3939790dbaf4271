use std::fmt;
use std::path::PathBuf;

use image::RgbImage;
use ndarray::Array3;

use crate::consts::RGB_CHANNEL_COUNT;

/// Element type of the data a raw frame was decoded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::F32 => "float32",
            Self::F64 => "float64",
        };
        f.write_str(name)
    }
}

/// A single frame as loaded from disk, before normalization.
#[derive(Clone, Debug)]
pub struct RawFrame {
    /// Sample values, shape = (height, width, channels), channels in {1, 3, 4}
    pub data: Array3<f32>,
    /// Element type of the source data
    pub sample_type: SampleType,
}

impl RawFrame {
    pub fn new(data: Array3<f32>, sample_type: SampleType) -> Self {
        Self { data, sample_type }
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// Smallest and largest finite sample, or `None` if there are none.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        finite_range(self.data.iter().copied())
    }
}

/// A display-ready RGB frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width, 3)
    pub data: Array3<u8>,
}

impl Frame {
    pub fn new(data: Array3<u8>) -> Self {
        debug_assert_eq!(data.dim().2, RGB_CHANNEL_COUNT);
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    /// Copy into an `image` buffer for resizing or encoding.
    pub fn to_rgb_image(&self) -> RgbImage {
        let (h, w, _) = self.data.dim();
        let mut img = RgbImage::new(w as u32, h as u32);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let (row, col) = (y as usize, x as usize);
            pixel.0 = [
                self.data[[row, col, 0]],
                self.data[[row, col, 1]],
                self.data[[row, col, 2]],
            ];
        }
        img
    }

    pub fn from_rgb_image(img: &RgbImage) -> Self {
        let (w, h) = img.dimensions();
        let data = Array3::from_shape_fn((h as usize, w as usize, RGB_CHANNEL_COUNT), |(r, c, ch)| {
            img.get_pixel(c as u32, r as u32).0[ch]
        });
        Self { data }
    }
}

/// Ordered frames of one run, in output order.
#[derive(Clone, Debug, Default)]
pub struct FrameSequence {
    pub frames: Vec<RawFrame>,
    /// Files that contributed frames, in load order
    pub sources: Vec<PathBuf>,
}

impl FrameSequence {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Append all frames of `other`, keeping their order.
    pub fn extend(&mut self, other: FrameSequence) {
        self.frames.extend(other.frames);
        self.sources.extend(other.sources);
    }

    /// Sequence-wide finite value range.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.frames
            .iter()
            .filter_map(RawFrame::value_range)
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
    }

    /// Source type shared by every frame, if there is exactly one.
    pub fn common_sample_type(&self) -> Option<SampleType> {
        let first = self.frames.first()?.sample_type;
        self.frames
            .iter()
            .all(|f| f.sample_type == first)
            .then_some(first)
    }
}

pub(crate) fn finite_range(values: impl Iterator<Item = f32>) -> Option<(f32, f32)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
