//! Playback controller driving a sorting animation.

use std::cell::RefCell;
use std::ops::RangeInclusive;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::error::RecordingError;
use crate::recording::{FrameRecorder, NoRecording};
use crate::{Algorithm, ArraySnapshot, RunControl, StepEmitter, Timer};

/// Interval at which a paused run re-checks its flags.
pub const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Step delay while recording, long enough for every frame to be painted.
pub const RECORDING_STEP_DELAY: Duration = Duration::from_millis(150);
/// Accepted step delays in milliseconds.
pub const SPEED_RANGE_MS: RangeInclusive<u32> = 5..=150;
/// Accepted array sizes.
pub const ARRAY_SIZE_RANGE: RangeInclusive<usize> = 10..=60;

/// Lifecycle of one sorting animation attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    /// Fresh array, nothing running
    #[default]
    Idle,
    /// Steps are being applied
    Running,
    /// Suspended before the next step
    Paused,
    /// All steps applied, every bar sorted
    Completed,
    /// Cancelled before the last step
    Stopped,
}

impl RunState {
    /// Whether a run currently owns the array.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, RunState::Running | RunState::Paused)
    }
}

/// Settings frozen for the duration of one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Delay between steps in milliseconds (smaller is faster)
    pub speed_ms: u32,
    /// Whether every step is paired with a captured frame
    pub record_mode: bool,
}

impl PlaybackConfig {
    /// Delay applied after each step.
    pub fn step_delay(&self) -> Duration {
        if self.record_mode {
            RECORDING_STEP_DELAY
        } else {
            Duration::from_millis(self.speed_ms as u64)
        }
    }
}

/// Adjustable settings of a controller, changeable only between runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackSettings {
    /// Delay between steps in milliseconds
    pub speed_ms: u32,
    /// Number of bars generated on reset
    pub array_size: usize,
    /// Smallest generated value
    pub min_value: u32,
    /// Largest generated value
    pub max_value: u32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            speed_ms: 50,
            array_size: 25,
            min_value: crate::data::DEFAULT_MIN_VALUE,
            max_value: crate::data::DEFAULT_MAX_VALUE,
        }
    }
}

impl PlaybackSettings {
    /// Copy with speed and size clamped to their accepted ranges.
    pub fn clamped(self) -> Self {
        Self {
            speed_ms: clamp_speed(self.speed_ms),
            array_size: clamp_size(self.array_size),
            ..self
        }
    }
}

fn clamp_speed(ms: u32) -> u32 {
    ms.clamp(*SPEED_RANGE_MS.start(), *SPEED_RANGE_MS.end())
}

fn clamp_size(size: usize) -> usize {
    size.clamp(*ARRAY_SIZE_RANGE.start(), *ARRAY_SIZE_RANGE.end())
}

/// What the presentation receives on every change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybackUpdate {
    /// Read-only copy of the current array
    pub snapshot: ArraySnapshot,
    /// Current lifecycle phase
    pub state: RunState,
    /// Steps applied so far in the current run
    pub step: usize,
    /// Whether the current run is recording
    pub recording: bool,
    /// Recording progress (0-100)
    pub recording_progress: u8,
}

/// How a call to [`PlaybackController::start`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step was applied
    Completed,
    /// Cancelled by `stop()` or by a reset
    Stopped,
    /// Not started because another run was active or the state forbids it
    Rejected,
}

#[derive(Debug)]
struct Session {
    snapshot: ArraySnapshot,
    state: RunState,
    settings: PlaybackSettings,
    control: RunControl,
    step: usize,
    recording: bool,
    progress: u8,
}

impl Session {
    fn update(&self) -> PlaybackUpdate {
        PlaybackUpdate {
            snapshot: self.snapshot.clone(),
            state: self.state,
            step: self.step,
            recording: self.recording,
            recording_progress: self.progress,
        }
    }

    fn reset_to(&mut self, snapshot: ArraySnapshot) {
        if self.state.is_active() {
            // Cancel the running loop before its array is replaced.
            self.control.cancel();
            info!("active run cancelled by reset");
        }
        self.control = RunControl::new();
        self.snapshot = snapshot;
        self.state = RunState::Idle;
        self.step = 0;
        self.recording = false;
        self.progress = 0;
    }

    fn regenerate(&mut self) {
        let s = self.settings;
        self.reset_to(ArraySnapshot::generate(s.array_size, s.min_value, s.max_value));
    }
}

type Listener = Rc<dyn Fn(&PlaybackUpdate)>;

struct Shared<T> {
    session: RefCell<Session>,
    listeners: RefCell<Vec<Listener>>,
    timer: T,
}

/// Drives a [`StepEmitter`] at a configurable cadence with pause, resume
/// and stop support.
///
/// The controller is a cheap handle: clones share the same session, so the
/// presentation can keep one to issue intents while another is busy
/// awaiting [`PlaybackController::start`]. All methods except `start` and
/// `record` return immediately.
///
/// ## Example
///
/// ```rust
/// # #[cfg(feature = "tokio")]
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use sortviz_core::{Algorithm, ArraySnapshot, PlaybackController, RunOutcome, RunState, TokioTimer};
///
/// let controller = PlaybackController::new(TokioTimer);
/// controller.set_speed_ms(5);
/// controller.load(ArraySnapshot::from_values(&[5, 3, 4, 1]));
///
/// assert_eq!(controller.start(Algorithm::Insertion).await, RunOutcome::Completed);
/// assert_eq!(controller.state(), RunState::Completed);
/// assert_eq!(controller.snapshot().values(), vec![1, 3, 4, 5]);
/// # }
/// # #[cfg(not(feature = "tokio"))]
/// # fn main() {}
/// ```
pub struct PlaybackController<T: Timer> {
    shared: Rc<Shared<T>>,
}

impl<T: Timer> Clone for PlaybackController<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: Timer> std::fmt::Debug for PlaybackController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("session", &self.shared.session.borrow())
            .field("listeners", &self.shared.listeners.borrow().len())
            .finish()
    }
}

impl<T: Timer> PlaybackController<T> {
    /// Create a controller with default settings and a freshly generated array.
    pub fn new(timer: T) -> Self {
        Self::with_settings(PlaybackSettings::default(), timer)
    }

    /// Create a controller with the given settings (clamped to their ranges).
    pub fn with_settings(settings: PlaybackSettings, timer: T) -> Self {
        let settings = settings.clamped();
        let snapshot =
            ArraySnapshot::generate(settings.array_size, settings.min_value, settings.max_value);
        let session = Session {
            snapshot,
            state: RunState::Idle,
            settings,
            control: RunControl::new(),
            step: 0,
            recording: false,
            progress: 0,
        };
        Self {
            shared: Rc::new(Shared {
                session: RefCell::new(session),
                listeners: RefCell::new(Vec::new()),
                timer,
            }),
        }
    }

    /// Register a callback invoked with a fresh [`PlaybackUpdate`] on every change.
    pub fn subscribe(&self, listener: impl Fn(&PlaybackUpdate) + 'static) {
        self.shared.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Current lifecycle phase.
    pub fn state(&self) -> RunState {
        self.shared.session.borrow().state
    }

    /// Copy of the most recently published array.
    pub fn snapshot(&self) -> ArraySnapshot {
        self.shared.session.borrow().snapshot.clone()
    }

    /// The update the presentation would currently see.
    pub fn current(&self) -> PlaybackUpdate {
        self.shared.session.borrow().update()
    }

    /// Current settings.
    pub fn settings(&self) -> PlaybackSettings {
        self.shared.session.borrow().settings
    }

    /// Recording progress (0-100) of the current run.
    pub fn recording_progress(&self) -> u8 {
        self.shared.session.borrow().progress
    }

    /// Whether the current run is recording.
    pub fn is_recording(&self) -> bool {
        self.shared.session.borrow().recording
    }

    /// Replace the array with a freshly generated one and return to `Idle`.
    ///
    /// Safe to call while a run is active: that run is cancelled first and
    /// ends without touching the new array.
    pub fn generate(&self) {
        self.shared.session.borrow_mut().regenerate();
        self.notify();
    }

    /// Replace the array with `snapshot` and return to `Idle`.
    ///
    /// Cancels an active run the same way [`PlaybackController::generate`] does.
    pub fn load(&self, snapshot: ArraySnapshot) {
        self.shared.session.borrow_mut().reset_to(snapshot);
        self.notify();
    }

    /// Change the step delay. Rejected (returns `false`) while a run is active.
    pub fn set_speed_ms(&self, speed_ms: u32) -> bool {
        let mut session = self.shared.session.borrow_mut();
        if session.state.is_active() {
            debug!(speed_ms, "speed change rejected during run");
            return false;
        }
        session.settings.speed_ms = clamp_speed(speed_ms);
        true
    }

    /// Change the array size and regenerate. Rejected (returns `false`)
    /// while a run is active.
    pub fn set_array_size(&self, array_size: usize) -> bool {
        {
            let mut session = self.shared.session.borrow_mut();
            if session.state.is_active() {
                debug!(array_size, "array size change rejected during run");
                return false;
            }
            session.settings.array_size = clamp_size(array_size);
            session.regenerate();
        }
        self.notify();
        true
    }

    /// Suspend before the next step. Only valid while `Running`.
    pub fn pause(&self) {
        {
            let mut session = self.shared.session.borrow_mut();
            if session.state != RunState::Running {
                debug!(state = ?session.state, "pause ignored");
                return;
            }
            session.control.pause();
            session.state = RunState::Paused;
        }
        self.notify();
    }

    /// Continue a paused run. Only valid while `Paused`.
    pub fn resume(&self) {
        {
            let mut session = self.shared.session.borrow_mut();
            if session.state != RunState::Paused {
                debug!(state = ?session.state, "resume ignored");
                return;
            }
            session.control.resume();
            session.state = RunState::Running;
        }
        self.notify();
    }

    /// Pause when running, resume when paused.
    pub fn toggle_pause(&self) {
        match self.state() {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(),
            state => debug!(?state, "toggle ignored"),
        }
    }

    /// Request cancellation of the active run.
    ///
    /// Idempotent, and a no-op once the run has completed or stopped. The
    /// state becomes `Stopped` as soon as the driving loop observes the
    /// request at the next step boundary; any recording in progress is
    /// discarded.
    pub fn stop(&self) {
        let session = self.shared.session.borrow();
        if !session.state.is_active() {
            debug!(state = ?session.state, "stop ignored");
            return;
        }
        session.control.cancel();
    }

    /// Run `algorithm` on the current array without recording.
    ///
    /// Valid from `Idle` or `Completed` (which regenerates the array first);
    /// anything else returns [`RunOutcome::Rejected`] without side effects.
    pub async fn start(&self, algorithm: Algorithm) -> RunOutcome {
        let (outcome, _) = self.drive(algorithm, None::<&mut NoRecording>).await;
        outcome
    }

    /// Run `algorithm` while pairing every step with a captured frame.
    ///
    /// Returns `Err` only when the recording as a whole failed (busy
    /// recorder, finalization or export failure). The playback result is
    /// unaffected by recording failures: a run that reached the end is
    /// still `Completed`.
    pub async fn record<R: FrameRecorder>(
        &self,
        algorithm: Algorithm,
        recorder: &mut R,
    ) -> Result<RunOutcome, RecordingError> {
        if recorder.is_busy() {
            debug!("recording rejected: previous recording still finalizing");
            return Err(RecordingError::Busy);
        }
        match self.drive(algorithm, Some(recorder)).await {
            (_, Some(err)) => Err(err),
            (outcome, None) => Ok(outcome),
        }
    }

    async fn drive<R: FrameRecorder>(
        &self,
        algorithm: Algorithm,
        mut recorder: Option<&mut R>,
    ) -> (RunOutcome, Option<RecordingError>) {
        let record_mode = recorder.is_some();
        let Some((control, initial, config)) = self.begin_run(record_mode) else {
            return (RunOutcome::Rejected, None);
        };
        info!(%algorithm, size = initial.len(), record_mode, "run started");
        self.notify();

        let timer = &self.shared.timer;
        if let Some(rec) = recorder.as_deref_mut() {
            rec.begin();
            timer.next_paint().await;
            let progress = rec.capture(None);
            self.set_progress(&control, progress);
        }

        let mut steps = StepEmitter::new(algorithm, &initial);
        let delay = config.step_delay();
        let outcome = loop {
            while control.is_paused() && !control.is_cancelled() {
                timer.sleep(PAUSE_POLL_INTERVAL).await;
            }
            if control.is_cancelled() {
                break RunOutcome::Stopped;
            }
            let Some(step) = steps.next() else {
                break RunOutcome::Completed;
            };
            trace!(kind = ?step.kind, "applying step");
            if !self.apply(&control, step.snapshot) {
                break RunOutcome::Stopped;
            }

            timer.sleep(delay).await;
            if let Some(rec) = recorder.as_deref_mut() {
                if !control.is_cancelled() {
                    timer.next_paint().await;
                    let progress = rec.capture(Some(steps.percent()));
                    self.set_progress(&control, progress);
                }
            }
        };

        if outcome == RunOutcome::Stopped {
            if let Some(rec) = recorder {
                rec.cancel();
            }
            self.end_run(&control, RunState::Stopped);
            info!(%algorithm, "run stopped");
            return (outcome, None);
        }

        self.end_run(&control, RunState::Completed);
        info!(%algorithm, "run completed");

        let Some(rec) = recorder else {
            return (outcome, None);
        };
        timer.next_paint().await;
        rec.capture(None);
        self.set_progress(&control, 100);

        let result = rec.finish(algorithm).await;
        self.finish_recording(&control);
        if let Err(err) = &result {
            warn!(error = %err, "recording produced no artifact");
        }
        (outcome, result.err())
    }

    fn begin_run(&self, record_mode: bool) -> Option<(RunControl, ArraySnapshot, PlaybackConfig)> {
        let mut session = self.shared.session.borrow_mut();
        match session.state {
            RunState::Idle => {}
            RunState::Completed => session.regenerate(),
            state => {
                debug!(?state, "start rejected");
                return None;
            }
        }

        let control = RunControl::new();
        session.control = control.clone();
        session.state = RunState::Running;
        session.step = 0;
        session.recording = record_mode;
        session.progress = 0;

        let config = PlaybackConfig {
            speed_ms: session.settings.speed_ms,
            record_mode,
        };
        Some((control, session.snapshot.clone(), config))
    }

    /// Publish a step if `control` still owns the session.
    fn apply(&self, control: &RunControl, snapshot: ArraySnapshot) -> bool {
        {
            let mut session = self.shared.session.borrow_mut();
            if !session.control.same_run(control) {
                return false;
            }
            session.snapshot = snapshot;
            session.step += 1;
        }
        self.notify();
        true
    }

    fn set_progress(&self, control: &RunControl, progress: u8) {
        {
            let mut session = self.shared.session.borrow_mut();
            if !session.control.same_run(control) {
                return;
            }
            session.progress = progress;
        }
        self.notify();
    }

    fn end_run(&self, control: &RunControl, state: RunState) {
        {
            let mut session = self.shared.session.borrow_mut();
            if !session.control.same_run(control) {
                return;
            }
            session.state = state;
            if state == RunState::Completed {
                session.snapshot = session.snapshot.mark_all_sorted();
            } else {
                session.recording = false;
                session.progress = 0;
            }
        }
        self.notify();
    }

    fn finish_recording(&self, control: &RunControl) {
        {
            let mut session = self.shared.session.borrow_mut();
            if !session.control.same_run(control) {
                return;
            }
            session.recording = false;
            session.progress = 0;
        }
        self.notify();
    }

    fn notify(&self) {
        let update = self.shared.session.borrow().update();
        let listeners: Vec<Listener> = self.shared.listeners.borrow().clone();
        for listener in listeners {
            listener(&update);
        }
    }
}

#[cfg(all(test, feature = "tokio"))]
mod tests {
    use super::*;
    use crate::TokioTimer;
    use std::cell::Cell;

    fn controller(values: &[u32]) -> PlaybackController<TokioTimer> {
        let controller = PlaybackController::new(TokioTimer);
        controller.load(ArraySnapshot::from_values(values));
        controller
    }

    fn record_steps(controller: &PlaybackController<TokioTimer>) -> Rc<RefCell<Vec<ArraySnapshot>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let last_step = Cell::new(0);
        controller.subscribe(move |update| {
            if update.step != last_step.get() {
                last_step.set(update.step);
                sink.borrow_mut().push(update.snapshot.clone());
            }
        });
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn test_basic_playback() {
        let ctrl = controller(&[4, 1, 3, 2]);
        assert_eq!(ctrl.state(), RunState::Idle);

        assert_eq!(ctrl.start(Algorithm::Bubble).await, RunOutcome::Completed);
        assert_eq!(ctrl.state(), RunState::Completed);

        let snapshot = ctrl.snapshot();
        assert_eq!(snapshot.values(), vec![1, 2, 3, 4]);
        assert_eq!(snapshot.sorted_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_steps_published_in_order() {
        let ctrl = controller(&[5, 3, 4, 1]);
        let seen = record_steps(&ctrl);
        ctrl.start(Algorithm::Insertion).await;

        let expected: Vec<_> = StepEmitter::new(Algorithm::Insertion, &ArraySnapshot::from_values(&[5, 3, 4, 1]))
            .map(|s| s.snapshot)
            .collect();
        assert_eq!(*seen.borrow(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_delay_follows_speed() {
        let ctrl = controller(&[1, 2]);
        assert!(ctrl.set_speed_ms(100));

        let started = tokio::time::Instant::now();
        ctrl.start(Algorithm::Insertion).await;
        // Boundary, key and settle steps, 100ms each.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(350), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_after_two_steps() {
        let ctrl = controller(&[5, 3, 4, 1]);
        let handle = ctrl.clone();
        ctrl.subscribe(move |update| {
            if update.step == 2 && update.state == RunState::Running {
                handle.stop();
            }
        });

        assert_eq!(ctrl.start(Algorithm::Insertion).await, RunOutcome::Stopped);
        assert_eq!(ctrl.state(), RunState::Stopped);

        let expected = StepEmitter::new(Algorithm::Insertion, &ArraySnapshot::from_values(&[5, 3, 4, 1]))
            .nth(1)
            .unwrap()
            .snapshot;
        assert_eq!(ctrl.snapshot(), expected);
        assert_eq!(ctrl.current().step, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let ctrl = controller(&[2, 1]);
        ctrl.stop();
        assert_eq!(ctrl.state(), RunState::Idle);

        ctrl.start(Algorithm::Bubble).await;
        let done = ctrl.snapshot();
        ctrl.stop();
        ctrl.stop();
        assert_eq!(ctrl.state(), RunState::Completed);
        assert_eq!(ctrl.snapshot(), done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_while_paused_is_idempotent() {
        let ctrl = controller(&[6, 5, 4, 3, 2, 1]);
        let (outcome, ()) = tokio::join!(ctrl.start(Algorithm::Bubble), async {
            tokio::time::sleep(Duration::from_millis(120)).await;
            ctrl.pause();
            assert_eq!(ctrl.state(), RunState::Paused);
            let step = ctrl.current().step;

            // Several pause polls go by without progress.
            tokio::time::sleep(Duration::from_millis(500)).await;
            assert_eq!(ctrl.current().step, step);

            ctrl.stop();
            ctrl.stop();
            tokio::time::sleep(Duration::from_millis(500)).await;
            assert_eq!(ctrl.state(), RunState::Stopped);
            assert_eq!(ctrl.current().step, step);
            ctrl.stop();
        });

        assert_eq!(outcome, RunOutcome::Stopped);
        assert_eq!(ctrl.state(), RunState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_delays_without_altering_steps() {
        let values = [9, 2, 7, 4, 4, 1];
        let plain = controller(&values);
        let plain_seen = record_steps(&plain);
        plain.start(Algorithm::Bubble).await;

        let paused = controller(&values);
        let paused_seen = record_steps(&paused);
        let handle = paused.clone();
        let fired = Cell::new(false);
        paused.subscribe(move |update| {
            if update.step == 3 && !fired.get() {
                fired.set(true);
                handle.pause();
            }
        });

        let started = tokio::time::Instant::now();
        let (outcome, ()) = tokio::join!(paused.start(Algorithm::Bubble), async {
            tokio::time::sleep(Duration::from_millis(1_000)).await;
            assert_eq!(paused.state(), RunState::Paused);
            assert_eq!(paused.current().step, 3);
            paused.resume();
        });

        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(*paused_seen.borrow(), *plain_seen.borrow());
        assert!(started.elapsed() >= Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_is_rejected() {
        let ctrl = controller(&[3, 2, 1]);
        let (first, second) = tokio::join!(ctrl.start(Algorithm::Insertion), async {
            tokio::task::yield_now().await;
            ctrl.start(Algorithm::Bubble).await
        });

        assert_eq!(first, RunOutcome::Completed);
        assert_eq!(second, RunOutcome::Rejected);
        assert_eq!(ctrl.snapshot().values(), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_config_changes_rejected_mid_run() {
        let ctrl = controller(&[3, 2, 1]);
        let (_, ()) = tokio::join!(ctrl.start(Algorithm::Insertion), async {
            tokio::task::yield_now().await;
            assert!(!ctrl.set_speed_ms(5));
            assert!(!ctrl.set_array_size(40));
        });
        assert_eq!(ctrl.settings().speed_ms, 50);
        assert_eq!(ctrl.snapshot().len(), 3);

        assert!(ctrl.set_array_size(500));
        assert_eq!(ctrl.snapshot().len(), 60);
        assert_eq!(ctrl.state(), RunState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_mid_run_cancels() {
        let ctrl = controller(&[6, 5, 4, 3, 2, 1]);
        let (outcome, ()) = tokio::join!(ctrl.start(Algorithm::Bubble), async {
            tokio::time::sleep(Duration::from_millis(120)).await;
            ctrl.generate();
        });

        assert_eq!(outcome, RunOutcome::Stopped);
        assert_eq!(ctrl.state(), RunState::Idle);
        let fresh = ctrl.snapshot();
        assert_eq!(fresh.len(), 25);
        assert_eq!(fresh.count_state(crate::BarState::Idle), 25);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_from_completed_resets_first() {
        let ctrl = controller(&[2, 1]);
        ctrl.start(Algorithm::Insertion).await;

        assert_eq!(ctrl.start(Algorithm::Insertion).await, RunOutcome::Completed);
        let snapshot = ctrl.snapshot();
        assert_eq!(snapshot.len(), 25);
        assert!(snapshot.is_sorted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_from_stopped_is_rejected() {
        let ctrl = controller(&[2, 1]);
        let (_, ()) = tokio::join!(ctrl.start(Algorithm::Insertion), async {
            ctrl.stop();
        });
        assert_eq!(ctrl.state(), RunState::Stopped);
        assert_eq!(ctrl.start(Algorithm::Insertion).await, RunOutcome::Rejected);

        ctrl.generate();
        assert_eq!(ctrl.start(Algorithm::Insertion).await, RunOutcome::Completed);
    }

    #[test]
    fn test_settings_clamped() {
        let settings = PlaybackSettings {
            speed_ms: 1,
            array_size: 100,
            ..Default::default()
        }
        .clamped();
        assert_eq!(settings.speed_ms, 5);
        assert_eq!(settings.array_size, 60);
    }

    #[test]
    fn test_step_delay() {
        let plain = PlaybackConfig { speed_ms: 20, record_mode: false };
        let recording = PlaybackConfig { speed_ms: 20, record_mode: true };
        assert_eq!(plain.step_delay(), Duration::from_millis(20));
        assert_eq!(recording.step_delay(), RECORDING_STEP_DELAY);
    }
}
