//! Whole-run timing.

use crate::stage::{Clock, StageEvent, StageObserver};

/// Guard reporting the total run time when dropped.
///
/// Create it first thing in `main` and keep it alive until exit; the total
/// is reported on normal completion and on early return alike. Does
/// nothing when disabled.
pub struct RunTimer<C: Clock, O: StageObserver> {
    clock: C,
    started: Option<C::Instant>,
    observer: O,
}

impl<C: Clock, O: StageObserver> RunTimer<C, O> {
    /// Start timing if `enabled`.
    pub fn start(enabled: bool, clock: C, observer: O) -> Self {
        let started = enabled.then(|| clock.now());
        Self {
            clock,
            started,
            observer,
        }
    }

    /// `true` if the total will be reported.
    pub const fn is_enabled(&self) -> bool {
        self.started.is_some()
    }
}

impl<C: Clock, O: StageObserver> Drop for RunTimer<C, O> {
    fn drop(&mut self) {
        if let Some(started) = self.started.take() {
            let total = self.clock.elapsed(&started);
            self.observer.observe(StageEvent::TotalElapsed(total));
        }
    }
}

impl<C: Clock, O: StageObserver> std::fmt::Debug for RunTimer<C, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunTimer")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}
