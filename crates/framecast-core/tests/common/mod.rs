use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use ndarray::{Array, Array3, Dimension};
use ndarray_npy::{write_npy, WritableElement};

use framecast_core::paths::Layout;

/// Write `array` to `path` in `.npy` format.
pub fn write_array<A, D>(path: &Path, array: &Array<A, D>)
where
    A: WritableElement,
    D: Dimension,
{
    write_npy(path, array).unwrap();
}

/// `n` frames of `h` x `w` samples spanning [-1, 1].
///
/// Sample value is `-1 + 2 * (i + y + x) / (n + h + w - 3)` so both ends
/// of the range occur.
pub fn signed_ramp(n: usize, h: usize, w: usize) -> Array3<f32> {
    let span = (n + h + w - 3).max(1) as f32;
    Array3::from_shape_fn((n, h, w), |(i, y, x)| -1.0 + 2.0 * (i + y + x) as f32 / span)
}

/// Write a solid-color PNG.
pub fn write_png(path: &Path, width: u32, height: u32, color: [u8; 3]) {
    RgbImage::from_pixel(width, height, Rgb(color))
        .save(path)
        .unwrap();
}

/// Default layout below `root` with its input directories created.
pub fn make_layout(root: &Path) -> Layout {
    let layout = Layout::with_root(root);
    fs::create_dir_all(layout.npy_path()).unwrap();
    fs::create_dir_all(layout.images_path()).unwrap();
    layout
}

/// Install an executable shell script named `name` in `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    {
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"#!/bin/sh\n").unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.sync_all().unwrap();
    }
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Stand-in for ffmpeg that writes the number of staged PNG frames into
/// the output file. Answers the encoder listing with `encoders`.
#[cfg(unix)]
pub fn fake_ffmpeg(dir: &Path, encoders: &str) -> PathBuf {
    let body = format!(
        r#"case "$1" in
  -version) echo "ffmpeg version fake"; exit 0 ;;
  -hide_banner) printf '%s\n' " V..... = Video" {listing}; exit 0 ;;
esac
for arg in "$@"; do
  case "$arg" in
    *frame_%06d.png) pattern="$arg" ;;
  esac
  out="$arg"
done
ls "$(dirname "$pattern")" | grep -c '\.png$' > "$out"
"#,
        listing = encoders
            .split_whitespace()
            .map(|name| format!("\" V....D {name}  fake {name}\""))
            .collect::<Vec<_>>()
            .join(" ")
    );
    write_script(dir, "ffmpeg-ok", &body)
}

/// Stand-in for ffmpeg that leaves a partial output and exits with status 1.
#[cfg(unix)]
pub fn failing_ffmpeg(dir: &Path) -> PathBuf {
    let body = r#"if [ "$1" = "-version" ]; then exit 0; fi
for arg in "$@"; do out="$arg"; done
echo "partial" > "$out"
echo "Unknown encoder 'libx264'" >&2
exit 1
"#;
    write_script(dir, "ffmpeg-fail", body)
}
