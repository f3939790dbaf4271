use std::fs::File;
use std::io::{BufWriter, Write};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage};
use tracing::debug;

use crate::encode::{EncodeConfig, VideoWriter};
use crate::error::{FramecastError, Result};
use crate::frame::Frame;

/// Animated GIF writer, looping forever.
///
/// GIF stores delays in centiseconds, so rates that do not divide 100
/// evenly are rounded by the format.
#[derive(Default)]
pub struct GifWriter {
    file: Option<BufWriter<File>>,
    frames: Vec<image::Frame>,
    delay: Option<Delay>,
}

impl GifWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Per-frame delay of `1000 / fps` milliseconds.
pub(crate) fn frame_delay(fps: f64) -> Delay {
    let millifps = ((fps * 1000.0).round() as u32).max(1);
    Delay::from_numer_denom_ms(1_000_000, millifps)
}

impl VideoWriter for GifWriter {
    fn begin(&mut self, config: &EncodeConfig) -> Result<()> {
        let file = File::create(&config.output).map_err(|e| {
            FramecastError::encoding(format!(
                "cannot create '{}': {e}",
                config.output.display()
            ))
        })?;
        self.file = Some(BufWriter::new(file));
        self.frames.clear();
        self.delay = Some(frame_delay(config.fps));
        debug!(output = %config.output.display(), "GIF container opened");
        Ok(())
    }

    fn write_frame(&mut self, index: usize, frame: &Frame) -> Result<()> {
        let delay = self
            .delay
            .ok_or_else(|| FramecastError::encoding("GIF writer not started"))?;
        if index != self.frames.len() {
            return Err(FramecastError::encoding(format!(
                "out-of-order frame {index}, expected {}",
                self.frames.len()
            )));
        }
        let rgba = DynamicImage::ImageRgb8(frame.to_rgb_image()).to_rgba8();
        self.frames.push(image::Frame::from_parts(rgba, 0, 0, delay));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| FramecastError::encoding("GIF writer not started"))?;
        let frames = std::mem::take(&mut self.frames);
        {
            let mut encoder = GifEncoder::new(&mut file);
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| FramecastError::encoding(format!("GIF setup failed: {e}")))?;
            encoder
                .encode_frames(frames)
                .map_err(|e| FramecastError::encoding(format!("GIF encoding failed: {e}")))?;
        }
        file.flush()
            .map_err(|e| FramecastError::encoding(format!("GIF flush failed: {e}")))?;
        self.delay = None;
        Ok(())
    }

    fn abort(&mut self) {
        self.file = None;
        self.frames.clear();
        self.delay = None;
    }
}
