//! Stage wrapping: uniform start/end logging and timing around each unit
//! of work.
//!
//! A [`Stage`] pairs a [`StageName`] with a zero-argument closure. Running
//! it through a [`StageRunner`] invokes the closure exactly once and
//! reports the boundaries to a [`StageObserver`]:
//!
//! 1. `Started` (when text logging is on)
//! 2. the work itself; an error is returned to the caller untouched
//! 3. `Finished` (when text logging is on)
//! 4. `Elapsed` (when the timer is on)
//! 5. `Separator`
//!
//! A failing stage reports `Failed` instead of steps 3 to 5.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::report::{RunReport, StageTiming};

/// The pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageName {
    /// Load the source image.
    Input,
    /// Edge-detection preprocessing.
    Canny,
    /// External vectorization engine.
    Core,
    /// Batch SVG to PNG conversion.
    Svg2Png,
}

impl StageName {
    /// Every stage in the order the pipeline runs them.
    pub const ALL: [Self; 4] = [Self::Input, Self::Canny, Self::Core, Self::Svg2Png];

    /// Identifier used in log lines and file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Canny => "canny",
            Self::Core => "core",
            Self::Svg2Png => "svg2png",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time source for stage timing.
///
/// Abstracted so tests can substitute a deterministic clock.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Capture the current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Boundary notifications emitted while stages run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    /// A stage is about to run.
    Started(StageName),
    /// A stage completed successfully.
    Finished(StageName),
    /// Wall-clock duration of a completed stage.
    Elapsed(StageName, Duration),
    /// A stage returned an error.
    Failed(StageName),
    /// Blank line between stages on the console.
    Separator,
    /// Wall-clock duration of the whole run.
    TotalElapsed(Duration),
}

/// Receiver of [`StageEvent`]s.
pub trait StageObserver {
    /// Handle one event.
    fn observe(&mut self, event: StageEvent);
}

/// Records events in order.
impl StageObserver for Vec<StageEvent> {
    fn observe(&mut self, event: StageEvent) {
        self.push(event);
    }
}

impl<O: StageObserver + ?Sized> StageObserver for &mut O {
    fn observe(&mut self, event: StageEvent) {
        (**self).observe(event);
    }
}

/// Writes events to the `tracing` subscriber; the separator goes to
/// stderr as a bare blank line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl StageObserver for LogObserver {
    fn observe(&mut self, event: StageEvent) {
        match event {
            StageEvent::Started(stage) => tracing::info!("start of stage {stage}"),
            StageEvent::Finished(stage) => tracing::info!("end of stage {stage}"),
            StageEvent::Elapsed(stage, taken) => {
                tracing::info!(%stage, "taken time: {:.3}s", taken.as_secs_f64());
            }
            StageEvent::Failed(stage) => tracing::error!("stage {stage} failed"),
            StageEvent::Separator => eprintln!(),
            StageEvent::TotalElapsed(taken) => {
                tracing::info!("total time: {:.3}s", taken.as_secs_f64());
            }
        }
    }
}

/// Which boundary lines a [`StageRunner`] emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSettings {
    /// Emit `Started` / `Finished` (`options_pre.log_text`).
    pub log_text: bool,
    /// Measure and emit `Elapsed` (`options.timer`).
    pub timer: bool,
}

impl From<&Config> for StageSettings {
    fn from(config: &Config) -> Self {
        Self {
            log_text: config.options_pre.log_text,
            timer: config.options.timer,
        }
    }
}

/// Runs stages one at a time with uniform reporting.
#[derive(Debug)]
pub struct StageRunner<C, O> {
    settings: StageSettings,
    clock: C,
    observer: O,
    report: RunReport,
}

impl<C: Clock, O: StageObserver> StageRunner<C, O> {
    /// Create a runner.
    pub const fn new(settings: StageSettings, clock: C, observer: O) -> Self {
        Self {
            settings,
            clock,
            observer,
            report: RunReport::new(),
        }
    }

    /// Run `work` as stage `name`.
    ///
    /// `work` is called exactly once. Its result is returned unchanged;
    /// there is no retry and no recovery.
    ///
    /// # Errors
    ///
    /// Returns whatever error `work` returns.
    pub fn run<T, E>(
        &mut self,
        name: StageName,
        work: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        if self.settings.log_text {
            self.observer.observe(StageEvent::Started(name));
        }
        let started = self.settings.timer.then(|| self.clock.now());

        let value = match work() {
            Ok(value) => value,
            Err(err) => {
                self.observer.observe(StageEvent::Failed(name));
                return Err(err);
            }
        };

        if self.settings.log_text {
            self.observer.observe(StageEvent::Finished(name));
        }
        if let Some(started) = started {
            let duration = self.clock.elapsed(&started);
            self.observer.observe(StageEvent::Elapsed(name, duration));
            self.report.push(StageTiming {
                stage: name,
                duration,
            });
        }
        self.observer.observe(StageEvent::Separator);
        Ok(value)
    }

    /// Timings of the stages completed so far (empty when the timer is off).
    pub const fn report(&self) -> &RunReport {
        &self.report
    }

    /// The observer, for inspection after a run.
    pub const fn observer(&self) -> &O {
        &self.observer
    }

    /// Consume the runner, returning the collected report.
    pub fn into_report(self) -> RunReport {
        self.report
    }
}

/// A named unit of work awaiting execution.
pub struct Stage<F> {
    name: StageName,
    work: F,
}

impl<F> Stage<F> {
    /// Pair `work` with a stage name.
    pub const fn new(name: StageName, work: F) -> Self {
        Self { name, work }
    }

    /// Invoke the work through `runner`.
    ///
    /// # Errors
    ///
    /// Returns whatever error the work returns.
    pub fn run<T, E, C, O>(self, runner: &mut StageRunner<C, O>) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        C: Clock,
        O: StageObserver,
    {
        runner.run(self.name, self.work)
    }
}

impl<F> fmt::Debug for Stage<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage").field("name", &self.name).finish_non_exhaustive()
    }
}
