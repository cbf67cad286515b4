//! Realtime delay values.

use serde::{Deserialize, Serialize};

/// Where a matched delay came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelaySource {
    /// A stop-level `delay` field, in seconds.
    ExplicitDelay,
    /// A stop-level absolute `time`, minus the scheduled instant.
    DerivedFromTimestamp,
    /// The trip-level aggregate delay.
    TripLevelFallback,
}

/// A signed adjustment to a scheduled time.
///
/// Positive is late. Zero means "confirmed on time"; "no data" is
/// represented by the absence of a `Delay`, never by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delay {
    pub seconds: i32,
    pub source: DelaySource,
}

impl Delay {
    pub fn new(seconds: i32, source: DelaySource) -> Self {
        Self { seconds, source }
    }

    pub fn as_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.seconds))
    }
}

/// A delay matched to one stop of one trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeUpdate {
    pub trip_id: String,
    /// Sequence of the stop-level update used, `None` for trip-level fallback.
    pub stop_sequence: Option<u32>,
    pub delay: Delay,
}
