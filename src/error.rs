//! Error types for capture, export, recording and configuration.

/// Failure to capture or encode a frame.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The viewport could not produce pixels
    #[error("viewport capture failed: {0}")]
    Viewport(String),
    /// Pixel buffer does not match its declared dimensions
    #[error("frame buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    FrameSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    /// Finalize was called without any captured frame
    #[error("no frames were captured")]
    NoFrames,
    /// The encoder rejected the frames
    #[error("encoding failed: {0}")]
    Encode(String),
}

#[cfg(feature = "gif")]
impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        CaptureError::Encode(err.to_string())
    }
}

/// Failure to hand a finished artifact to its destination.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Writing to disk failed
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The destination is not available (no window, no document, ...)
    #[error("export destination unavailable: {0}")]
    Unavailable(String),
}

/// Failure surfaced to the user for a recording as a whole.
///
/// Single-frame capture failures never reach this type; they are logged
/// and skipped.
#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    /// A previous recording is still being finalized
    #[error("a previous recording is still being finalized")]
    Busy,
    /// The capture sink could not produce an artifact
    #[error("failed to finalize recording")]
    Finalize(#[source] CaptureError),
    /// The artifact could not be saved
    #[error("failed to export recording")]
    Export(#[source] ExportError),
}

/// Failure to load configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Malformed TOML
    #[cfg(feature = "toml")]
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    /// A color string could not be parsed
    #[error("invalid color for {field}: {value:?}")]
    InvalidColor { field: &'static str, value: String },
}
