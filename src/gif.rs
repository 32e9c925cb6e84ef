//! Animated GIF encoding for recorded runs.

use std::time::Duration;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use tracing::debug;

use crate::capture::{CaptureSink, FrameHandle, RgbaFrame, Viewport};
use crate::color::{Palette, Rgb};
use crate::error::CaptureError;

/// Quantization speed passed to the encoder (1 is best quality, 30 fastest).
const ENCODER_SPEED: i32 = 10;

/// [`CaptureSink`] that accumulates frames in memory and encodes a looping GIF.
///
/// Frames whose size differs from the one given to [`CaptureSink::reset`]
/// are cropped or padded with the background color.
pub struct GifCaptureSink {
    width: u32,
    height: u32,
    background: Rgb,
    frames: Vec<Frame>,
}

impl std::fmt::Debug for GifCaptureSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifCaptureSink")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("background", &self.background)
            .field("frames", &self.frames.len())
            .finish()
    }
}

impl Default for GifCaptureSink {
    fn default() -> Self {
        Self::new()
    }
}

impl GifCaptureSink {
    /// Sink padding with the neon palette background.
    pub fn new() -> Self {
        Self::with_background(Palette::neon().background)
    }

    /// Sink padding with `background`.
    pub fn with_background(background: Rgb) -> Self {
        Self {
            width: 0,
            height: 0,
            background,
            frames: Vec::new(),
        }
    }

    /// Target frame size as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn to_image(&self, frame: RgbaFrame) -> Result<RgbaImage, CaptureError> {
        let frame = if (frame.width, frame.height) == (self.width, self.height) {
            frame
        } else {
            frame.fit_to(self.width, self.height, self.background)
        };
        RgbaImage::from_raw(frame.width, frame.height, frame.pixels).ok_or_else(|| {
            CaptureError::Encode(format!("pixel buffer does not match {}x{}", self.width, self.height))
        })
    }
}

impl CaptureSink for GifCaptureSink {
    fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.frames.clear();
    }

    fn request_frame(
        &mut self,
        viewport: &dyn Viewport,
        hold: Duration,
    ) -> Result<FrameHandle, CaptureError> {
        let image = self.to_image(viewport.capture()?)?;
        let delay = Delay::from_saturating_duration(hold);
        self.frames.push(Frame::from_parts(image, 0, 0, delay));
        Ok(FrameHandle(self.frames.len() - 1))
    }

    fn discard(&mut self) {
        self.frames.clear();
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    async fn finalize(&mut self) -> Result<Vec<u8>, CaptureError> {
        if self.frames.is_empty() {
            return Err(CaptureError::NoFrames);
        }
        let frames = std::mem::take(&mut self.frames);
        let count = frames.len();

        let mut buf = Vec::new();
        {
            let mut encoder = GifEncoder::new_with_speed(&mut buf, ENCODER_SPEED);
            encoder.set_repeat(Repeat::Infinite)?;
            encoder.encode_frames(frames)?;
        }
        debug!(frames = count, bytes = buf.len(), "gif encoded");
        Ok(buf)
    }
}
