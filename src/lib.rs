//! # sortviz-core
//!
//! Step-by-step sorting animation engine with playback control and GIF
//! recording.
//!
//! This crate provides platform-agnostic data structures and logic for:
//! - Generating arrays of bars with stable identities and visual states
//! - Emitting insertion and bubble sort as a lazy sequence of snapshots
//! - Controlling playback (speed, pause, resume, stop) one step at a time
//! - Recording a run frame by frame and exporting it as an animated GIF
//! - Laying out and rasterizing snapshots as a bar chart (with optional web support)
//!
//! ## Features
//!
//! - `tokio` (default) - Tokio-backed [`TokioTimer`] for native playback
//! - `gif` (default) - [`GifCaptureSink`] backed by the `image` crate
//! - `serde` - Enable serialization/deserialization for data structures
//! - `toml` - Load [`VisualizerConfig`] from TOML
//! - `web` - Canvas rendering, browser timer and download export
//!
//! ## Example
//!
//! ```rust
//! # #[cfg(feature = "tokio")]
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use sortviz_core::{Algorithm, PlaybackController, RunOutcome, RunState, TokioTimer};
//!
//! let controller = PlaybackController::new(TokioTimer);
//! controller.set_speed_ms(5);
//! controller.subscribe(|update| {
//!     let _ = (update.state, update.snapshot.values());
//! });
//!
//! assert_eq!(controller.start(Algorithm::Insertion).await, RunOutcome::Completed);
//! assert_eq!(controller.state(), RunState::Completed);
//! assert!(controller.snapshot().is_sorted());
//! # }
//! # #[cfg(not(feature = "tokio"))]
//! # fn main() {}
//! ```

mod animation;
mod capture;
mod color;
mod config;
mod control;
mod data;
mod error;
#[cfg(feature = "gif")]
mod gif;
mod recording;
pub mod render;
mod steps;
mod timer;

pub use animation::{
    PlaybackConfig, PlaybackController, PlaybackSettings, PlaybackUpdate, RunOutcome, RunState,
    ARRAY_SIZE_RANGE, PAUSE_POLL_INTERVAL, RECORDING_STEP_DELAY, SPEED_RANGE_MS,
};
pub use capture::{CaptureSink, ExportSink, FileExport, FrameHandle, RgbaFrame, Viewport};
pub use color::{parse_color, Palette, Rgb};
pub use config::{ColorConfig, VisualizerConfig};
pub use control::RunControl;
pub use data::{ArraySnapshot, Bar, BarState, DEFAULT_MAX_VALUE, DEFAULT_MIN_VALUE};
pub use error::{CaptureError, ConfigError, ExportError, RecordingError};
#[cfg(feature = "gif")]
pub use gif::GifCaptureSink;
pub use recording::{FrameRecorder, NoRecording, RecordingConfig, RecordingCoordinator, RecordingPhase};
pub use render::{BarChartView, RenderConfig, RenderResult};
pub use steps::{Algorithm, Step, StepEmitter, StepKind, UnknownAlgorithm};
#[cfg(feature = "tokio")]
pub use timer::TokioTimer;
pub use timer::Timer;

#[cfg(feature = "web")]
pub use render::web::{render_to_canvas, CanvasViewport, DownloadExport};
#[cfg(feature = "web")]
pub use timer::web::WebTimer;
