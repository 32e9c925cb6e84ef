//! Frame capture orchestration for recorded runs.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::capture::{CaptureSink, ExportSink, Viewport};
use crate::error::RecordingError;
use crate::Algorithm;

/// Hook the playback controller calls while a run is being recorded.
///
/// The controller awaits a paint before every `capture`, so each frame
/// observes the snapshot that was just published.
#[allow(async_fn_in_trait)]
pub trait FrameRecorder {
    /// Whether a previous recording is still being finalized.
    fn is_busy(&self) -> bool;

    /// Prepare a new recording. Called once before the baseline frame.
    fn begin(&mut self);

    /// Capture the current view.
    ///
    /// `progress` is the run's completion percentage after the step just
    /// applied, or `None` for the baseline and final frames. Returns the
    /// progress to publish.
    fn capture(&mut self, progress: Option<u8>) -> u8;

    /// Turn captured frames into an artifact and export it.
    async fn finish(&mut self, algorithm: Algorithm) -> Result<(), RecordingError>;

    /// Discard the in-progress recording.
    fn cancel(&mut self);
}

/// Recorder used for plain playback; captures nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRecording;

impl FrameRecorder for NoRecording {
    fn is_busy(&self) -> bool {
        false
    }

    fn begin(&mut self) {}

    fn capture(&mut self, progress: Option<u8>) -> u8 {
        progress.unwrap_or(0)
    }

    async fn finish(&mut self, _algorithm: Algorithm) -> Result<(), RecordingError> {
        Ok(())
    }

    fn cancel(&mut self) {}
}

/// Recording settings.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RecordingConfig {
    /// How long each frame is held in the exported animation
    pub frame_hold_ms: u32,
    /// Frame width when the viewport reports no size
    pub fallback_width: u32,
    /// Frame height when the viewport reports no size
    pub fallback_height: u32,
    /// Exported file name prefix; the algorithm name is appended
    pub file_prefix: String,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            frame_hold_ms: 100,
            fallback_width: 800,
            fallback_height: 400,
            file_prefix: "neon-sort".to_string(),
        }
    }
}

impl RecordingConfig {
    /// Hold time for one frame.
    pub fn frame_hold(&self) -> Duration {
        Duration::from_millis(self.frame_hold_ms as u64)
    }

    /// Suggested export file name for `algorithm`.
    pub fn filename(&self, algorithm: Algorithm) -> String {
        format!("{}-{}.gif", self.file_prefix, algorithm)
    }
}

/// Where a [`RecordingCoordinator`] is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecordingPhase {
    /// Nothing in flight
    #[default]
    Idle,
    /// Frames are being captured
    Capturing,
    /// The sink is producing the artifact
    Finalizing,
}

/// Couples a playback run to a [`CaptureSink`] and an [`ExportSink`].
///
/// ## Example
///
/// ```rust
/// # #[cfg(all(feature = "tokio", feature = "gif"))]
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use sortviz_core::{
///     Algorithm, ArraySnapshot, BarChartView, FileExport, GifCaptureSink, PlaybackController,
///     RecordingConfig, RecordingCoordinator, RenderConfig, TokioTimer,
/// };
///
/// let controller = PlaybackController::new(TokioTimer);
/// controller.load(ArraySnapshot::from_values(&[3, 1, 2]));
///
/// let view = BarChartView::new(RenderConfig::new(120, 60));
/// view.attach(&controller);
///
/// let dir = std::env::temp_dir();
/// let mut recorder = RecordingCoordinator::new(
///     GifCaptureSink::new(),
///     view,
///     FileExport::new(&dir),
///     RecordingConfig::default(),
/// );
///
/// controller.record(Algorithm::Bubble, &mut recorder).await.unwrap();
/// assert!(dir.join("neon-sort-bubble.gif").exists());
/// # }
/// # #[cfg(not(all(feature = "tokio", feature = "gif")))]
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct RecordingCoordinator<S, V, E> {
    sink: S,
    viewport: V,
    export: E,
    config: RecordingConfig,
    phase: RecordingPhase,
    progress: u8,
    skipped: usize,
}

impl<S, V, E> RecordingCoordinator<S, V, E>
where
    S: CaptureSink,
    V: Viewport,
    E: ExportSink,
{
    /// Create an idle coordinator.
    pub fn new(sink: S, viewport: V, export: E, config: RecordingConfig) -> Self {
        Self {
            sink,
            viewport,
            export,
            config,
            phase: RecordingPhase::Idle,
            progress: 0,
            skipped: 0,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RecordingPhase {
        self.phase
    }

    /// Last published progress (0-100).
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Frames whose capture failed in the current recording.
    pub fn skipped_frames(&self) -> usize {
        self.skipped
    }

    /// The capture sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The export destination.
    pub fn export(&self) -> &E {
        &self.export
    }

    /// Recording settings.
    pub fn config(&self) -> &RecordingConfig {
        &self.config
    }

    /// Force the coordinator back to idle, dropping any captured frames.
    ///
    /// Use this to recover when a recording future was dropped mid-finalize.
    pub fn abort(&mut self) {
        self.sink.discard();
        self.phase = RecordingPhase::Idle;
        self.progress = 0;
    }

    fn frame_size(&self) -> (u32, u32) {
        match self.viewport.size() {
            (0, _) | (_, 0) => (self.config.fallback_width, self.config.fallback_height),
            size => size,
        }
    }
}

impl<S, V, E> FrameRecorder for RecordingCoordinator<S, V, E>
where
    S: CaptureSink,
    V: Viewport,
    E: ExportSink,
{
    fn is_busy(&self) -> bool {
        self.phase == RecordingPhase::Finalizing
    }

    fn begin(&mut self) {
        let (width, height) = self.frame_size();
        self.sink.reset(width, height);
        self.phase = RecordingPhase::Capturing;
        self.progress = 0;
        self.skipped = 0;
        info!(width, height, "recording started");
    }

    fn capture(&mut self, progress: Option<u8>) -> u8 {
        if self.phase != RecordingPhase::Capturing {
            return self.progress;
        }
        match self.sink.request_frame(&self.viewport, self.config.frame_hold()) {
            Ok(handle) => debug!(frame = handle.0, "frame captured"),
            Err(err) => {
                self.skipped += 1;
                warn!(error = %err, "frame capture failed, skipping");
            }
        }
        if let Some(progress) = progress {
            self.progress = progress.min(100);
        }
        self.progress
    }

    async fn finish(&mut self, algorithm: Algorithm) -> Result<(), RecordingError> {
        if self.phase != RecordingPhase::Capturing {
            return Ok(());
        }
        self.phase = RecordingPhase::Finalizing;
        self.progress = 100;
        info!(frames = self.sink.frame_count(), skipped = self.skipped, "rendering recording");

        let result = match self.sink.finalize().await {
            Ok(artifact) => {
                let filename = self.config.filename(algorithm);
                self.export
                    .save(&artifact, &filename)
                    .map_err(RecordingError::Export)
            }
            Err(err) => Err(RecordingError::Finalize(err)),
        };

        self.phase = RecordingPhase::Idle;
        self.progress = 0;
        if let Err(err) = &result {
            error!(error = %err, "recording failed");
        }
        result
    }

    fn cancel(&mut self) {
        if self.phase == RecordingPhase::Capturing {
            info!(frames = self.sink.frame_count(), "recording discarded");
            self.sink.discard();
        }
        self.phase = RecordingPhase::Idle;
        self.progress = 0;
    }
}
