//! Per-action timing records kept by every probe.
//!
//! Each probe accumulates one [`ActionRecord`] per lifecycle step ("init",
//! "page_load", "form_submit") keyed by its action tag. Re-running a probe
//! overwrites the records for the tags it touches; every `run` call is one
//! fresh attempt, not an accumulation.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Timing and outcome of one probe action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord {
    /// Whether the action (combined with all preceding steps) succeeded.
    pub success: bool,
    /// UNIX epoch seconds when the action started.
    pub timestamp_start: f64,
    /// UNIX epoch seconds when the action finished.
    pub timestamp_finish: f64,
    /// Elapsed seconds, measured monotonically (never negative).
    pub duration: f64,
}

/// Running timer for a single probe action.
///
/// Wall-clock stamps come from the system clock; the duration comes from a
/// monotonic clock so it stays non-negative even if the wall clock steps.
#[derive(Debug)]
pub struct ActionTimer {
    wall_start: f64,
    mono_start: Instant,
}

impl ActionTimer {
    /// Starts the timer now.
    pub fn start() -> Self {
        Self {
            wall_start: epoch_seconds(),
            mono_start: Instant::now(),
        }
    }

    /// Stops the timer and produces the record for this action.
    pub fn finish(self, success: bool) -> ActionRecord {
        let duration = self.mono_start.elapsed().as_secs_f64();
        ActionRecord {
            success,
            timestamp_start: self.wall_start,
            timestamp_finish: self.wall_start + duration,
            duration,
        }
    }
}

/// Snapshot of one probe's recorded actions.
///
/// Serializes as a single-entry map keyed by the probe name:
/// `{"checkout": {"init": {...}, "page_load": {...}}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    probe: String,
    actions: IndexMap<String, ActionRecord>,
}

impl MetricsReport {
    pub(crate) fn new(probe: impl Into<String>, actions: IndexMap<String, ActionRecord>) -> Self {
        Self {
            probe: probe.into(),
            actions,
        }
    }

    /// Name of the probe this report belongs to.
    pub fn probe_name(&self) -> &str {
        &self.probe
    }

    /// Recorded actions in the order they were first recorded.
    pub fn actions(&self) -> &IndexMap<String, ActionRecord> {
        &self.actions
    }

    /// Looks up the record for one action tag.
    pub fn action(&self, tag: &str) -> Option<&ActionRecord> {
        self.actions.get(tag)
    }
}

impl Serialize for MetricsReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.probe, &self.actions)?;
        map.end()
    }
}

/// Current system time as UNIX epoch seconds.
pub(crate) fn epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
