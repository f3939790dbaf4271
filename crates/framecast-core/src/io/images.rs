use std::path::{Path, PathBuf};

use image::{ImageFormat, ImageReader};
use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::error::{FramecastError, Result};
use crate::frame::{FrameSequence, RawFrame, SampleType};
use crate::io::sources::{load_each, sorted_files, ErrorPolicy, LoadReport};

/// Which files of an image directory belong to the sequence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageFilter {
    /// Only accept file names starting with this prefix (e.g. `frame_`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl ImageFilter {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Whether `path` names a decodable image accepted by this filter.
    pub fn accepts(&self, path: &Path) -> bool {
        if ImageFormat::from_path(path).is_err() {
            return false;
        }
        match (&self.prefix, path.file_name().and_then(|n| n.to_str())) {
            (Some(prefix), Some(name)) => name.starts_with(prefix.as_str()),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

/// Image files in `dir` accepted by `filter`, sorted by file name.
pub fn list_images(dir: &Path, filter: &ImageFilter) -> Result<Vec<PathBuf>> {
    sorted_files(dir, |p| filter.accepts(p))
}

/// Decode one image into a raw 8-bit frame.
///
/// Grayscale images keep a single channel; everything else becomes RGB.
pub fn load_image(path: &Path) -> Result<RawFrame> {
    let img = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| FramecastError::format(path, e.to_string()))?;

    let data = if img.color().has_color() {
        let rgb = img.to_rgb8();
        let (w, h) = rgb.dimensions();
        Array3::from_shape_fn((h as usize, w as usize, 3), |(row, col, ch)| {
            rgb.get_pixel(col as u32, row as u32).0[ch] as f32
        })
    } else {
        let gray = img.to_luma8();
        let (w, h) = gray.dimensions();
        Array3::from_shape_fn((h as usize, w as usize, 1), |(row, col, _)| {
            gray.get_pixel(col as u32, row as u32).0[0] as f32
        })
    };

    if data.is_empty() {
        return Err(FramecastError::format(path, "image has zero size"));
    }
    Ok(RawFrame::new(data, SampleType::U8))
}

/// Decode every accepted image of `dir`, in file name order.
pub fn load_image_dir(dir: &Path, filter: &ImageFilter, policy: ErrorPolicy) -> Result<LoadReport> {
    let files = list_images(dir, filter)?;
    load_each(dir, &files, policy, |path| {
        Ok(FrameSequence {
            frames: vec![load_image(path)?],
            sources: vec![path.to_path_buf()],
        })
    })
}
