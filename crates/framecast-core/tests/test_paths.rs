#[allow(dead_code)]
mod common;

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use framecast_core::error::FramecastError;
use framecast_core::io::{ErrorPolicy, ImageFilter};
use framecast_core::paths::Layout;
use framecast_core::pipeline::{OutputConfig, SourceConfig};

#[test]
fn test_default_layout() {
    let layout = Layout::default();
    assert_eq!(layout.npy_path(), PathBuf::from("./source/npy"));
    assert_eq!(layout.images_path(), PathBuf::from("./source/images"));
    assert_eq!(layout.movie_path(), PathBuf::from("./results/movie"));
}

#[test]
fn test_absolute_dirs_ignore_root() {
    let layout = Layout {
        npy_dir: PathBuf::from("/data/arrays"),
        ..Layout::with_root("/project")
    };
    assert_eq!(layout.npy_path(), PathBuf::from("/data/arrays"));
    assert_eq!(layout.movie_path(), PathBuf::from("/project/results/movie"));
}

#[test]
fn test_missing_array_is_config_error() {
    let dir = TempDir::new().unwrap();
    let layout = common::make_layout(dir.path());
    let err = layout
        .resolve_input(&SourceConfig::npy("tactile_target_array.npy"))
        .unwrap_err();
    assert!(matches!(err, FramecastError::Config(_)));
}

#[test]
fn test_missing_dirs_are_config_errors() {
    let dir = TempDir::new().unwrap();
    let layout = Layout::with_root(dir.path());
    let npy_dir = SourceConfig::NpyDir {
        on_error: ErrorPolicy::Skip,
    };
    let images = SourceConfig::Images {
        on_error: ErrorPolicy::Skip,
        filter: ImageFilter::default(),
    };
    assert!(matches!(
        layout.resolve_input(&npy_dir),
        Err(FramecastError::Config(_))
    ));
    assert!(matches!(
        layout.resolve_input(&images),
        Err(FramecastError::Config(_))
    ));
}

#[test]
fn test_resolves_existing_inputs() {
    let dir = TempDir::new().unwrap();
    let layout = common::make_layout(dir.path());
    let array = layout.npy_path().join("stack.npy");
    fs::write(&array, b"x").unwrap();

    assert_eq!(
        layout.resolve_input(&SourceConfig::npy("stack.npy")).unwrap(),
        array
    );
    assert_eq!(
        layout
            .resolve_input(&SourceConfig::NpyDir {
                on_error: ErrorPolicy::Abort
            })
            .unwrap(),
        layout.npy_path()
    );
}

#[test]
fn test_output_path_naming() {
    let layout = Layout::with_root("/project");
    let movie = PathBuf::from("/project/results/movie");

    let plain = OutputConfig::default();
    assert_eq!(
        layout.output_path("tactile_target_array", &plain, "mp4", (256, 256)),
        movie.join("tactile_target_array.mp4")
    );

    let suffixed = OutputConfig {
        suffix: "_ffmpeg".into(),
        ..Default::default()
    };
    assert_eq!(
        layout.output_path("tactile_output_array", &suffixed, "mp4", (256, 256)),
        movie.join("tactile_output_array_ffmpeg.mp4")
    );

    let sized = OutputConfig {
        size_suffix: true,
        ..Default::default()
    };
    assert_eq!(
        layout.output_path("run3", &sized, "gif", (256, 192)),
        movie.join("run3_256x192.gif")
    );

    let fixed = OutputConfig {
        file_name: Some("animation_256x256.mp4".into()),
        size_suffix: true,
        ..Default::default()
    };
    assert_eq!(
        layout.output_path("images", &fixed, "mp4", (128, 256)),
        movie.join("animation_256x256.mp4")
    );
}

#[test]
fn test_source_stem() {
    let npy = SourceConfig::npy("a.npy");
    assert_eq!(npy.stem(&PathBuf::from("/x/source/npy/a.npy")), "a");
    let images = SourceConfig::Images {
        on_error: ErrorPolicy::Skip,
        filter: ImageFilter::default(),
    };
    assert_eq!(images.stem(&PathBuf::from("/x/source/images")), "images");
}
