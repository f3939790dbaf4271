pub mod batch;
pub mod config;
pub mod info;
pub mod progress;
pub mod run;

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use framecast_core::pipeline::{JobConfig, Preset};

#[derive(Clone, Copy, ValueEnum)]
pub enum PresetArg {
    NpyVideo,
    NpyGif,
    NpyFfmpeg,
    Universal,
    Animation,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::NpyVideo => Preset::NpyVideo,
            PresetArg::NpyGif => Preset::NpyGif,
            PresetArg::NpyFfmpeg => Preset::NpyFfmpeg,
            PresetArg::Universal => Preset::Universal,
            PresetArg::Animation => Preset::Animation,
        }
    }
}

/// Read a job config from a TOML file.
pub fn read_job_config(path: &Path) -> Result<JobConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("Invalid job config {}", path.display()))
}

/// Job from a config file, else from a preset, with command-line overrides.
pub fn build_job(
    preset: Option<PresetArg>,
    config: Option<&Path>,
    root: Option<&Path>,
    fps: Option<f64>,
) -> Result<JobConfig> {
    let mut job = match (config, preset) {
        (Some(path), _) => read_job_config(path)?,
        (None, Some(preset)) => JobConfig::preset(preset.into()),
        (None, None) => anyhow::bail!("either a preset or --config is required"),
    };
    if let Some(root) = root {
        job.layout.root = root.to_path_buf();
    }
    if let Some(fps) = fps {
        job.output.fps = fps;
    }
    Ok(job)
}
