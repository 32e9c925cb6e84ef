//! End-to-end recording through the playback controller.

#![cfg(all(feature = "tokio", feature = "gif"))]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use sortviz_core::{
    Algorithm, ArraySnapshot, BarChartView, CaptureError, CaptureSink, ExportError, ExportSink,
    FrameHandle, FrameRecorder, GifCaptureSink, PlaybackController, RecordingConfig,
    RecordingCoordinator, RecordingError, RecordingPhase, RenderConfig, RgbaFrame, RunOutcome,
    RunState, StepEmitter, TokioTimer, Viewport, RECORDING_STEP_DELAY,
};

#[derive(Debug, Default)]
struct CountingSink {
    dims: (u32, u32),
    frames: Vec<Duration>,
    discards: usize,
    finalized: usize,
    fail_finalize: bool,
}

impl CaptureSink for CountingSink {
    fn reset(&mut self, width: u32, height: u32) {
        self.dims = (width, height);
        self.frames.clear();
    }

    fn request_frame(
        &mut self,
        viewport: &dyn Viewport,
        hold: Duration,
    ) -> Result<FrameHandle, CaptureError> {
        viewport.capture()?;
        self.frames.push(hold);
        Ok(FrameHandle(self.frames.len() - 1))
    }

    fn discard(&mut self) {
        self.discards += 1;
        self.frames.clear();
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    async fn finalize(&mut self) -> Result<Vec<u8>, CaptureError> {
        self.finalized += 1;
        if self.fail_finalize {
            return Err(CaptureError::Encode("encoder exploded".into()));
        }
        Ok(vec![self.frames.len() as u8])
    }
}

#[derive(Debug, Default)]
struct MemoryExport {
    saved: Vec<(String, Vec<u8>)>,
    fail: bool,
}

impl ExportSink for MemoryExport {
    fn save(&mut self, artifact: &[u8], suggested_filename: &str) -> Result<(), ExportError> {
        if self.fail {
            return Err(ExportError::Unavailable("disk full".into()));
        }
        self.saved.push((suggested_filename.to_string(), artifact.to_vec()));
        Ok(())
    }
}

/// Viewport that has not been laid out yet.
struct Unsized;

impl Viewport for Unsized {
    fn size(&self) -> (u32, u32) {
        (0, 0)
    }

    fn capture(&self) -> Result<RgbaFrame, CaptureError> {
        Ok(RgbaFrame::filled(1, 1, (0, 0, 0)))
    }
}

/// Recorder that always reports a recording still in flight.
struct AlwaysBusy;

impl FrameRecorder for AlwaysBusy {
    fn is_busy(&self) -> bool {
        true
    }

    fn begin(&mut self) {
        panic!("busy recorder must not begin");
    }

    fn capture(&mut self, _progress: Option<u8>) -> u8 {
        0
    }

    async fn finish(&mut self, _algorithm: Algorithm) -> Result<(), RecordingError> {
        Ok(())
    }

    fn cancel(&mut self) {}
}

fn controller(values: &[u32]) -> (PlaybackController<TokioTimer>, BarChartView) {
    let controller = PlaybackController::new(TokioTimer);
    controller.load(ArraySnapshot::from_values(values));
    let view = BarChartView::new(RenderConfig::new(64, 32));
    view.attach(&controller);
    (controller, view)
}

fn coordinator<V: Viewport>(
    view: V,
    sink: CountingSink,
    export: MemoryExport,
) -> RecordingCoordinator<CountingSink, V, MemoryExport> {
    RecordingCoordinator::new(sink, view, export, RecordingConfig::default())
}

#[tokio::test(start_paused = true)]
async fn records_one_frame_per_step_plus_baseline_and_final() {
    let values = [5, 3, 4, 1];
    let step_count = StepEmitter::new(Algorithm::Insertion, &ArraySnapshot::from_values(&values)).count();
    let (ctrl, view) = controller(&values);
    let mut rec = coordinator(view, CountingSink::default(), MemoryExport::default());

    let outcome = ctrl.record(Algorithm::Insertion, &mut rec).await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed);

    let sink = rec.sink();
    assert_eq!(sink.dims, (64, 32));
    assert_eq!(sink.frames.len(), step_count + 2);
    assert!(sink.frames.iter().all(|hold| *hold == Duration::from_millis(100)));
    assert_eq!(sink.finalized, 1);

    let saved = &rec.export().saved;
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "neon-sort-insertion.gif");
    assert_eq!(saved[0].1, vec![(step_count + 2) as u8]);

    assert_eq!(ctrl.state(), RunState::Completed);
    assert!(!ctrl.is_recording());
    assert_eq!(ctrl.recording_progress(), 0);
    assert_eq!(rec.phase(), RecordingPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn recording_publishes_progress_up_to_100() {
    let (ctrl, view) = controller(&[4, 3, 2, 1]);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    ctrl.subscribe(move |update| {
        if update.recording {
            sink.borrow_mut().push(update.recording_progress);
        }
    });

    let mut rec = coordinator(view, CountingSink::default(), MemoryExport::default());
    ctrl.record(Algorithm::Bubble, &mut rec).await.unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.first(), Some(&0));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress went backwards: {seen:?}");
    assert_eq!(seen.last(), Some(&100));
}

#[tokio::test(start_paused = true)]
async fn recording_uses_fixed_step_delay() {
    let values = [2, 1, 3];
    let step_count = StepEmitter::new(Algorithm::Bubble, &ArraySnapshot::from_values(&values)).count();
    let (ctrl, view) = controller(&values);
    assert!(ctrl.set_speed_ms(5));
    let mut rec = coordinator(view, CountingSink::default(), MemoryExport::default());

    let started = tokio::time::Instant::now();
    ctrl.record(Algorithm::Bubble, &mut rec).await.unwrap();
    assert!(started.elapsed() >= RECORDING_STEP_DELAY * step_count as u32);
}

#[tokio::test(start_paused = true)]
async fn stop_discards_recording() {
    let (ctrl, view) = controller(&[9, 7, 5, 3, 1]);
    let handle = ctrl.clone();
    ctrl.subscribe(move |update| {
        if update.step == 3 && update.state == RunState::Running {
            handle.stop();
        }
    });
    let mut rec = coordinator(view, CountingSink::default(), MemoryExport::default());

    let outcome = ctrl.record(Algorithm::Bubble, &mut rec).await.unwrap();
    assert_eq!(outcome, RunOutcome::Stopped);
    assert_eq!(ctrl.state(), RunState::Stopped);
    assert_eq!(ctrl.recording_progress(), 0);
    assert!(!ctrl.is_recording());

    let sink = rec.sink();
    assert_eq!(sink.discards, 1);
    assert_eq!(sink.finalized, 0);
    assert_eq!(sink.frames.len(), 0);
    assert!(rec.export().saved.is_empty());
    assert_eq!(rec.phase(), RecordingPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn stop_while_paused_discards_recording() {
    let (ctrl, view) = controller(&[9, 7, 5, 3, 1]);
    let mut rec = coordinator(view, CountingSink::default(), MemoryExport::default());

    let (outcome, ()) = tokio::join!(ctrl.record(Algorithm::Bubble, &mut rec), async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        ctrl.pause();
        let step = ctrl.current().step;
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(ctrl.current().step, step);

        ctrl.stop();
        ctrl.stop();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(ctrl.current().step, step);
    });

    assert_eq!(outcome.unwrap(), RunOutcome::Stopped);
    assert_eq!(ctrl.state(), RunState::Stopped);
    assert!(!ctrl.is_recording());
    assert_eq!(ctrl.recording_progress(), 0);

    let sink = rec.sink();
    assert_eq!(sink.discards, 1);
    assert_eq!(sink.finalized, 0);
    assert!(rec.export().saved.is_empty());
    assert_eq!(rec.phase(), RecordingPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn finalize_failure_is_reported_after_completion() {
    let (ctrl, view) = controller(&[3, 1, 2]);
    let sink = CountingSink {
        fail_finalize: true,
        ..Default::default()
    };
    let mut rec = coordinator(view, sink, MemoryExport::default());

    let err = ctrl.record(Algorithm::Insertion, &mut rec).await.unwrap_err();
    assert!(matches!(err, RecordingError::Finalize(CaptureError::Encode(_))));
    assert_eq!(ctrl.state(), RunState::Completed);
    assert!(ctrl.snapshot().is_sorted());
    assert_eq!(ctrl.recording_progress(), 0);
    assert!(!ctrl.is_recording());
    assert!(rec.export().saved.is_empty());
    assert!(!rec.is_busy());
}

#[tokio::test(start_paused = true)]
async fn export_failure_is_reported() {
    let (ctrl, view) = controller(&[2, 1]);
    let export = MemoryExport {
        fail: true,
        ..Default::default()
    };
    let mut rec = coordinator(view, CountingSink::default(), export);

    let err = ctrl.record(Algorithm::Bubble, &mut rec).await.unwrap_err();
    assert!(matches!(err, RecordingError::Export(ExportError::Unavailable(_))));
    assert_eq!(ctrl.state(), RunState::Completed);
}

#[tokio::test(start_paused = true)]
async fn busy_recorder_is_rejected() {
    let (ctrl, _view) = controller(&[2, 1]);
    let err = ctrl.record(Algorithm::Bubble, &mut AlwaysBusy).await.unwrap_err();
    assert!(matches!(err, RecordingError::Busy));
    assert_eq!(ctrl.state(), RunState::Idle);
    assert_eq!(ctrl.snapshot().values(), vec![2, 1]);
}

#[tokio::test(start_paused = true)]
async fn unsized_viewport_falls_back_to_default_dimensions() {
    let (ctrl, _view) = controller(&[2, 1]);
    let mut rec = coordinator(Unsized, CountingSink::default(), MemoryExport::default());
    ctrl.record(Algorithm::Insertion, &mut rec).await.unwrap();
    assert_eq!(rec.sink().dims, (800, 400));
}

#[tokio::test(start_paused = true)]
async fn records_a_real_gif() {
    let (ctrl, view) = controller(&[30, 90, 60, 10]);
    let mut rec = RecordingCoordinator::new(
        GifCaptureSink::new(),
        view,
        MemoryExport::default(),
        RecordingConfig {
            file_prefix: "demo".into(),
            ..Default::default()
        },
    );

    ctrl.record(Algorithm::Bubble, &mut rec).await.unwrap();

    let saved = &rec.export().saved;
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "demo-bubble.gif");
    assert!(saved[0].1.starts_with(b"GIF89a"));
}

#[tokio::test(start_paused = true)]
async fn second_recording_after_completion_regenerates() {
    let (ctrl, view) = controller(&[2, 1]);
    let mut rec = coordinator(view, CountingSink::default(), MemoryExport::default());

    ctrl.record(Algorithm::Bubble, &mut rec).await.unwrap();
    ctrl.record(Algorithm::Insertion, &mut rec).await.unwrap();

    assert_eq!(ctrl.snapshot().len(), 25);
    let names: Vec<_> = rec.export().saved.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["neon-sort-bubble.gif", "neon-sort-insertion.gif"]);
}
