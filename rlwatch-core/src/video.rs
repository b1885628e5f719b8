//! Frames and video encoding.
use anyhow::{ensure, Result};
use std::path::Path;

/// An RGB image rendered from an environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Pixels in row-major order, three bytes per pixel.
    pub data: Vec<u8>,

    /// Width in pixels.
    pub width: usize,

    /// Height in pixels.
    pub height: usize,
}

impl Frame {
    /// Constructs a frame, checking that `data` holds `width * height` RGB pixels.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> Result<Self> {
        ensure!(
            data.len() == width * height * 3,
            "A {}x{} frame needs {} bytes, got {}",
            width,
            height,
            width * height * 3,
            data.len()
        );
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// `(width, height)` of the frame.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// Writes frames into a video file.
///
/// Encoding is left to implementations, which typically wrap a codec library
/// or an external process.
pub trait VideoEncoder {
    /// Starts a new video file at `path`.
    fn open(&mut self, path: &Path) -> Result<()>;

    /// Appends a frame to the video opened last.
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Finalizes the video file.
    fn close(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_check() {
        assert!(Frame::new(vec![0; 12], 2, 2).is_ok());
        assert!(Frame::new(vec![0; 11], 2, 2).is_err());
    }
}
