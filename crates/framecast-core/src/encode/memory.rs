use crate::encode::{EncodeConfig, VideoWriter};
use crate::error::{FramecastError, Result};
use crate::frame::Frame;

/// In-memory writer for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryWriter {
    config: Option<EncodeConfig>,
    frames: Vec<Frame>,
    finished: bool,
    aborted: bool,
}

impl InMemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&EncodeConfig> {
        self.config.as_ref()
    }

    /// Frames in the order they were written.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl VideoWriter for InMemoryWriter {
    fn begin(&mut self, config: &EncodeConfig) -> Result<()> {
        self.config = Some(config.clone());
        self.frames.clear();
        self.finished = false;
        self.aborted = false;
        Ok(())
    }

    fn write_frame(&mut self, index: usize, frame: &Frame) -> Result<()> {
        if index != self.frames.len() {
            return Err(FramecastError::encoding(format!(
                "out-of-order frame {index}, expected {}",
                self.frames.len()
            )));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}
