//! Pause and cancellation signals for a single run.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Flags {
    paused: Cell<bool>,
    cancelled: Cell<bool>,
}

/// Shared control token for one playback run.
///
/// Every run gets its own token, so a stale loop from a cancelled run can
/// never observe flags meant for its successor. The driving loop reads the
/// flags through the token at every step boundary instead of caching them.
///
/// ## Example
///
/// ```rust
/// use sortviz_core::RunControl;
///
/// let control = RunControl::new();
/// let observer = control.clone();
///
/// control.pause();
/// assert!(observer.is_paused());
///
/// control.cancel();
/// control.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RunControl {
    flags: Rc<Flags>,
}

impl RunControl {
    /// Create a fresh token with both flags cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a pause before the next step.
    pub fn pause(&self) {
        self.flags.paused.set(true);
    }

    /// Clear a pending pause.
    pub fn resume(&self) {
        self.flags.paused.set(false);
    }

    /// Request cancellation. Irreversible for this token.
    pub fn cancel(&self) {
        self.flags.cancelled.set(true);
    }

    /// Whether a pause is pending.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.flags.paused.get()
    }

    /// Whether cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flags.cancelled.get()
    }

    /// Whether two handles refer to the same run.
    #[inline]
    pub fn same_run(&self, other: &RunControl) -> bool {
        Rc::ptr_eq(&self.flags, &other.flags)
    }
}
