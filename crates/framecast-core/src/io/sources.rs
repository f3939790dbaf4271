use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{FramecastError, Result};
use crate::frame::FrameSequence;
use crate::io::npy::load_npy;

/// What to do when one file of a multi-file source cannot be loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Log the failure, record it in the report and keep going.
    #[default]
    Skip,
    /// Stop at the first failure.
    Abort,
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "Skip"),
            Self::Abort => write!(f, "Abort"),
        }
    }
}

/// Frames loaded from a multi-file source, plus the files that were skipped.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub sequence: FrameSequence,
    pub skipped: Vec<(PathBuf, FramecastError)>,
}

/// Regular files in `dir` accepted by `keep`, sorted by file name.
pub(crate) fn sorted_files(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(FramecastError::NotFound(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && keep(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// All `.npy` files in `dir`, sorted by file name.
pub fn list_npy_files(dir: &Path) -> Result<Vec<PathBuf>> {
    sorted_files(dir, |p| {
        p.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("npy"))
    })
}

/// Load each file in order and concatenate the frames.
///
/// Failures follow `policy`. A run where nothing loads is a format error
/// on `dir`.
pub(crate) fn load_each<F>(
    dir: &Path,
    files: &[PathBuf],
    policy: ErrorPolicy,
    mut load: F,
) -> Result<LoadReport>
where
    F: FnMut(&Path) -> Result<FrameSequence>,
{
    let mut report = LoadReport::default();
    for path in files {
        match load(path) {
            Ok(seq) => report.sequence.extend(seq),
            Err(e) if policy == ErrorPolicy::Skip => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable file");
                report.skipped.push((path.clone(), e));
            }
            Err(e) => return Err(e),
        }
    }

    if report.sequence.is_empty() {
        let reason = if files.is_empty() {
            "no input files found".to_string()
        } else {
            format!("none of the {} input files could be loaded", files.len())
        };
        return Err(FramecastError::format(dir, reason));
    }

    info!(
        dir = %dir.display(),
        files = files.len(),
        skipped = report.skipped.len(),
        frames = report.sequence.len(),
        "Source directory loaded"
    );
    Ok(report)
}

/// Load every `.npy` file of `dir` (sorted by name) into one sequence.
pub fn load_npy_dir(dir: &Path, policy: ErrorPolicy) -> Result<LoadReport> {
    let files = list_npy_files(dir)?;
    load_each(dir, &files, policy, load_npy)
}
