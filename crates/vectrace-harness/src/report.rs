//! Per-stage timing report for a finished run.
//!
//! Durations are serialized as fractional seconds (`f64`) since
//! `std::time::Duration` does not implement serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::stage::StageName;

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Wall-clock duration of one completed stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTiming {
    /// Which stage.
    pub stage: StageName,
    /// How long it took (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

/// Timings collected by a [`StageRunner`](crate::StageRunner) with the
/// timer enabled, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    stages: Vec<StageTiming>,
}

impl RunReport {
    /// Empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub(crate) fn push(&mut self, timing: StageTiming) {
        self.stages.push(timing);
    }

    /// Recorded timings.
    #[must_use]
    pub fn stages(&self) -> &[StageTiming] {
        &self.stages
    }

    /// `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Sum of all recorded stage durations.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }

    /// Format the report as a human-readable table.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("{:<12} {:>12} {:>9}", "Stage", "Duration", "% Total"));
        lines.push("-".repeat(35));

        let total_ms = duration_ms(self.total());
        for timing in &self.stages {
            let ms = duration_ms(timing.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!("{:<12} {ms:>10.3}ms {pct:>8.1}%", timing.stage.as_str()));
        }

        lines.push("-".repeat(35));
        lines.push(format!("{:<12} {total_ms:>10.3}ms", "total"));
        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
