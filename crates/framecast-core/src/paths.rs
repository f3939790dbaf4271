use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FramecastError, Result};
use crate::pipeline::config::{OutputConfig, SourceConfig};

/// Conventional directory layout. Relative directories are resolved
/// against `root`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub root: PathBuf,
    pub npy_dir: PathBuf,
    pub images_dir: PathBuf,
    pub movie_dir: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            npy_dir: PathBuf::from("source/npy"),
            images_dir: PathBuf::from("source/images"),
            movie_dir: PathBuf::from("results/movie"),
        }
    }
}

impl Layout {
    /// Default layout below `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn npy_path(&self) -> PathBuf {
        self.root.join(&self.npy_dir)
    }

    pub fn images_path(&self) -> PathBuf {
        self.root.join(&self.images_dir)
    }

    pub fn movie_path(&self) -> PathBuf {
        self.root.join(&self.movie_dir)
    }

    /// Concrete input location for `source`.
    ///
    /// Fails with a configuration error when the location does not exist.
    pub fn resolve_input(&self, source: &SourceConfig) -> Result<PathBuf> {
        let path = match source {
            SourceConfig::Npy { file } => {
                let dir = self.npy_path();
                let path = dir.join(file);
                if !path.is_file() {
                    return Err(FramecastError::config(format!(
                        "input array '{}' does not exist",
                        path.display()
                    )));
                }
                path
            }
            SourceConfig::NpyDir { .. } => require_dir(self.npy_path())?,
            SourceConfig::Images { .. } => require_dir(self.images_path())?,
        };
        debug!(input = %path.display(), "Input resolved");
        Ok(path)
    }

    /// Output file for a sequence named `stem` encoded at `size`.
    pub fn output_path(
        &self,
        stem: &str,
        output: &OutputConfig,
        extension: &str,
        size: (u32, u32),
    ) -> PathBuf {
        let movie = self.movie_path();
        if let Some(ref name) = output.file_name {
            return movie.join(name);
        }
        let mut name = format!("{stem}{}", output.suffix);
        if output.size_suffix {
            name.push_str(&format!("_{}x{}", size.0, size.1));
        }
        movie.join(format!("{name}.{extension}"))
    }
}

fn require_dir(path: PathBuf) -> Result<PathBuf> {
    if path.is_dir() {
        Ok(path)
    } else {
        Err(FramecastError::config(format!(
            "input directory '{}' does not exist",
            path.display()
        )))
    }
}

