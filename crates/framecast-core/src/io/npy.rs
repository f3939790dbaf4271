use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use ndarray::{ArrayD, Axis, Ix3, Ix4};
use ndarray_npy::{ReadNpyError, ReadNpyExt, ReadableElement};
use num_traits::AsPrimitive;
use tracing::debug;

use crate::error::{FramecastError, Result};
use crate::frame::{finite_range, FrameSequence, RawFrame, SampleType};

type ReadFn = fn(&[u8]) -> std::result::Result<Option<ArrayD<f32>>, ReadNpyError>;

/// Element types tried in order when decoding an array file.
const READERS: [(SampleType, ReadFn); 10] = [
    (SampleType::F32, read_as::<f32> as ReadFn),
    (SampleType::F64, read_as::<f64> as ReadFn),
    (SampleType::U8, read_as::<u8> as ReadFn),
    (SampleType::U16, read_as::<u16> as ReadFn),
    (SampleType::I16, read_as::<i16> as ReadFn),
    (SampleType::I32, read_as::<i32> as ReadFn),
    (SampleType::I64, read_as::<i64> as ReadFn),
    (SampleType::U32, read_as::<u32> as ReadFn),
    (SampleType::U64, read_as::<u64> as ReadFn),
    (SampleType::I8, read_as::<i8> as ReadFn),
];

/// Shape, element type and value range of an array file.
#[derive(Clone, Debug)]
pub struct ArrayInfo {
    pub path: PathBuf,
    pub shape: Vec<usize>,
    pub sample_type: SampleType,
    pub min: Option<f32>,
    pub max: Option<f32>,
}

impl ArrayInfo {
    /// Number of frames along the first axis.
    pub fn frame_count(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }
}

fn read_as<T>(bytes: &[u8]) -> std::result::Result<Option<ArrayD<f32>>, ReadNpyError>
where
    T: ReadableElement + AsPrimitive<f32>,
{
    match ArrayD::<T>::read_npy(bytes) {
        Ok(array) => Ok(Some(array.mapv(|v| v.as_()))),
        Err(ReadNpyError::WrongDescriptor(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Read an array file of any supported element type, converted to f32.
fn read_array(path: &Path) -> Result<(ArrayD<f32>, SampleType)> {
    if !path.is_file() {
        return Err(FramecastError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Err(FramecastError::format(path, "file is empty"));
    }
    let mmap = unsafe { Mmap::map(&file)? };

    for (sample_type, read) in READERS {
        match read(&mmap[..]) {
            Ok(Some(array)) => return Ok((array, sample_type)),
            Ok(None) => continue,
            Err(e) => return Err(FramecastError::format(path, e.to_string())),
        }
    }
    Err(FramecastError::format(
        path,
        "unsupported element type (expected an integer or float array)",
    ))
}

/// Report shape, element type and value range without splitting frames.
pub fn inspect_npy(path: &Path) -> Result<ArrayInfo> {
    let (array, sample_type) = read_array(path)?;
    let range = finite_range(array.iter().copied());
    Ok(ArrayInfo {
        path: path.to_path_buf(),
        shape: array.shape().to_vec(),
        sample_type,
        min: range.map(|(lo, _)| lo),
        max: range.map(|(_, hi)| hi),
    })
}

/// Load an array file whose first axis indexes frames.
///
/// Accepts `(N, H, W)` grayscale and `(N, H, W, C)` arrays with C in {1, 3, 4}.
pub fn load_npy(path: &Path) -> Result<FrameSequence> {
    let (array, sample_type) = read_array(path)?;
    debug!(path = %path.display(), shape = ?array.shape(), dtype = %sample_type, "Array loaded");

    let frames = split_frames(array, sample_type, path)?;
    Ok(FrameSequence {
        frames,
        sources: vec![path.to_path_buf()],
    })
}

fn split_frames(array: ArrayD<f32>, sample_type: SampleType, path: &Path) -> Result<Vec<RawFrame>> {
    let shape = array.shape().to_vec();
    let frames: Vec<RawFrame> = match array.ndim() {
        3 => {
            let stack = array
                .into_dimensionality::<Ix3>()
                .map_err(|e| FramecastError::format(path, e.to_string()))?;
            stack
                .outer_iter()
                .map(|f| RawFrame::new(f.insert_axis(Axis(2)).to_owned(), sample_type))
                .collect()
        }
        4 => {
            let channels = shape[3];
            if !matches!(channels, 1 | 3 | 4) {
                return Err(FramecastError::format(
                    path,
                    format!("unsupported channel count {channels} in shape {shape:?}"),
                ));
            }
            let stack = array
                .into_dimensionality::<Ix4>()
                .map_err(|e| FramecastError::format(path, e.to_string()))?;
            stack
                .outer_iter()
                .map(|f| RawFrame::new(f.to_owned(), sample_type))
                .collect()
        }
        n => {
            return Err(FramecastError::format(
                path,
                format!("expected a 3D or 4D array (frames first), got {n}D shape {shape:?}"),
            ))
        }
    };

    if frames.is_empty() {
        return Err(FramecastError::format(path, "array contains no frames"));
    }
    if shape[1] == 0 || shape[2] == 0 {
        return Err(FramecastError::format(
            path,
            format!("frames have zero size: {shape:?}"),
        ));
    }
    Ok(frames)
}
