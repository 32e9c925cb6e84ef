//! Contracts for frame capture and artifact export.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CaptureError, ExportError};

/// RGBA pixel buffer for one captured frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaFrame {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel data, 4 bytes per pixel, row-major
    /// Layout: [r0, g0, b0, a0, r1, g1, b1, a1, ...]
    pub pixels: Vec<u8>,
}

impl RgbaFrame {
    /// Wrap a pixel buffer, checking its length against the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, CaptureError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(CaptureError::FrameSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A frame filled with one opaque color.
    pub fn filled(width: u32, height: u32, rgb: (u8, u8, u8)) -> Self {
        let pixel = [rgb.0, rgb.1, rgb.2, 255];
        let pixels = pixel
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// RGBA value at `(x, y)`, or `None` when out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ])
    }

    /// Crop or pad to `width` x `height`, filling new area with `background`.
    pub fn fit_to(&self, width: u32, height: u32, background: (u8, u8, u8)) -> Self {
        if self.width == width && self.height == height {
            return self.clone();
        }
        let mut out = Self::filled(width, height, background);
        let copy_w = self.width.min(width) as usize * 4;
        for y in 0..self.height.min(height) as usize {
            let src = y * self.width as usize * 4;
            let dst = y * width as usize * 4;
            out.pixels[dst..dst + copy_w].copy_from_slice(&self.pixels[src..src + copy_w]);
        }
        out
    }
}

/// Presentation surface that can report its size and hand out its pixels.
pub trait Viewport {
    /// Current size in pixels as `(width, height)`; zero when unknown.
    fn size(&self) -> (u32, u32);

    /// Capture what is currently shown.
    fn capture(&self) -> Result<RgbaFrame, CaptureError>;
}

impl<V: Viewport + ?Sized> Viewport for &V {
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }

    fn capture(&self) -> Result<RgbaFrame, CaptureError> {
        (**self).capture()
    }
}

/// Index of a frame accepted by a [`CaptureSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrameHandle(pub usize);

/// Frame accumulator that turns captured frames into an exportable artifact.
#[allow(async_fn_in_trait)]
pub trait CaptureSink {
    /// Drop all frames and target the given frame dimensions.
    fn reset(&mut self, width: u32, height: u32);

    /// Capture the viewport and append it, held for `hold` on playback.
    fn request_frame(
        &mut self,
        viewport: &dyn Viewport,
        hold: Duration,
    ) -> Result<FrameHandle, CaptureError>;

    /// Throw away the in-progress artifact.
    fn discard(&mut self);

    /// Number of frames accepted since the last reset.
    fn frame_count(&self) -> usize;

    /// Encode accumulated frames into artifact bytes.
    async fn finalize(&mut self) -> Result<Vec<u8>, CaptureError>;
}

/// Destination for a finished artifact.
pub trait ExportSink {
    /// Persist `artifact` under `suggested_filename`.
    fn save(&mut self, artifact: &[u8], suggested_filename: &str) -> Result<(), ExportError>;
}

/// Writes artifacts into a directory on disk.
#[derive(Clone, Debug)]
pub struct FileExport {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl FileExport {
    /// Export into `dir`; the directory must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Vec::new(),
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, oldest first.
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl ExportSink for FileExport {
    fn save(&mut self, artifact: &[u8], suggested_filename: &str) -> Result<(), ExportError> {
        // Never let a suggested name escape the target directory.
        let name = Path::new(suggested_filename)
            .file_name()
            .ok_or_else(|| ExportError::Unavailable(format!("bad filename {suggested_filename:?}")))?;
        let path = self.dir.join(name);
        std::fs::write(&path, artifact).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(path = %path.display(), bytes = artifact.len(), "artifact exported");
        self.saved.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_checked() {
        assert!(RgbaFrame::new(2, 2, vec![0; 16]).is_ok());
        let err = RgbaFrame::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, CaptureError::FrameSize { expected: 16, actual: 15, .. }));
    }

    #[test]
    fn test_fit_to_pads_and_crops() {
        let mut frame = RgbaFrame::filled(2, 1, (10, 20, 30));
        frame.pixels[4..8].copy_from_slice(&[1, 2, 3, 255]);

        let padded = frame.fit_to(3, 2, (0, 0, 0));
        assert_eq!(padded.pixel(0, 0), Some([10, 20, 30, 255]));
        assert_eq!(padded.pixel(1, 0), Some([1, 2, 3, 255]));
        assert_eq!(padded.pixel(2, 0), Some([0, 0, 0, 255]));
        assert_eq!(padded.pixel(0, 1), Some([0, 0, 0, 255]));

        let cropped = frame.fit_to(1, 1, (0, 0, 0));
        assert_eq!(cropped.pixels, vec![10, 20, 30, 255]);
    }

    #[test]
    fn test_file_export_writes_into_dir() {
        let dir = std::env::temp_dir().join(format!("sortviz-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut export = FileExport::new(&dir);
        export.save(b"GIF89a", "../escape/neon-sort-bubble.gif").unwrap();

        let written = dir.join("neon-sort-bubble.gif");
        assert_eq!(export.saved(), &[written.clone()]);
        assert_eq!(std::fs::read(&written).unwrap(), b"GIF89a");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_export_missing_dir() {
        let mut export = FileExport::new("/definitely/not/a/real/dir");
        let err = export.save(b"x", "out.gif").unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
