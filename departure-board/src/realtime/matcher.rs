//! Matching realtime updates to a scheduled stop.
//!
//! Resolution order for a trip at stop sequence `n`:
//! 1. No updates for the trip: no data.
//! 2. Stop-level updates with `stop_sequence <= n`, nearest first.
//!    Within one update: departure delay, arrival delay, then delays derived
//!    from absolute departure/arrival times. Derived delays are only used for
//!    an update at `n` itself and only when within the credibility bound.
//! 3. The trip-level delay.
//! 4. No data.

use chrono::Duration;
use tracing::trace;

use crate::domain::{Delay, DelaySource, RealtimeUpdate};

use super::feed::{FeedSnapshot, StopUpdate};

/// Default credibility bound for timestamp-derived delays.
const DEFAULT_MAX_DERIVED_HOURS: i64 = 12;

/// Finds the delay that applies to a stop of a trip.
#[derive(Debug, Clone, Copy)]
pub struct RealtimeMatcher {
    max_derived_secs: i64,
}

impl Default for RealtimeMatcher {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_MAX_DERIVED_HOURS))
    }
}

impl RealtimeMatcher {
    /// Timestamp-derived delays larger than `max_derived` in magnitude are
    /// discarded. Some feeds publish epoch-zero placeholders.
    pub fn new(max_derived: Duration) -> Self {
        Self {
            max_derived_secs: max_derived.num_seconds(),
        }
    }

    /// Find the delay for `trip_id` at `stop_sequence`.
    ///
    /// `scheduled_epoch` is the scheduled departure as POSIX seconds; without
    /// it no delay can be derived from absolute times.
    pub fn match_delay(
        &self,
        snapshot: &FeedSnapshot,
        trip_id: &str,
        stop_sequence: u32,
        scheduled_epoch: Option<i64>,
    ) -> Option<RealtimeUpdate> {
        let trip = snapshot.trip(trip_id)?;

        let applicable = trip
            .stop_updates
            .iter()
            .rev()
            .filter(|u| u.stop_sequence <= stop_sequence);

        for update in applicable {
            let epoch = scheduled_epoch.filter(|_| update.stop_sequence == stop_sequence);
            if let Some(delay) = self.stop_level_delay(trip_id, update, epoch) {
                return Some(RealtimeUpdate {
                    trip_id: trip_id.to_string(),
                    stop_sequence: Some(update.stop_sequence),
                    delay,
                });
            }
        }

        trip.delay.map(|seconds| RealtimeUpdate {
            trip_id: trip_id.to_string(),
            stop_sequence: None,
            delay: Delay::new(seconds, DelaySource::TripLevelFallback),
        })
    }

    fn stop_level_delay(
        &self,
        trip_id: &str,
        update: &StopUpdate,
        scheduled_epoch: Option<i64>,
    ) -> Option<Delay> {
        let events = [update.departure, update.arrival];

        let explicit = events.iter().flatten().find_map(|e| e.delay);
        if let Some(seconds) = explicit {
            return Some(Delay::new(seconds, DelaySource::ExplicitDelay));
        }

        let scheduled = scheduled_epoch?;
        events
            .iter()
            .flatten()
            .filter_map(|e| e.time)
            .find_map(|time| self.derive(trip_id, update.stop_sequence, time, scheduled))
    }

    fn derive(&self, trip_id: &str, stop_sequence: u32, time: i64, scheduled: i64) -> Option<Delay> {
        let seconds = time.checked_sub(scheduled)?;
        if seconds.abs() > self.max_derived_secs {
            trace!(trip_id, stop_sequence, seconds, "discarding non-credible derived delay");
            return None;
        }
        let seconds = i32::try_from(seconds).ok()?;
        Some(Delay::new(seconds, DelaySource::DerivedFromTimestamp))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::realtime::feed::{StopEvent, TripUpdate};
    use proptest::prelude::*;

    const SCHEDULED: i64 = 1_710_234_900;
    const TWELVE_HOURS: i64 = 12 * 3600;

    proptest! {
        /// A derived delay beyond the bound never surfaces.
        #[test]
        fn non_credible_never_surfaces(
            offset in prop_oneof![
                (TWELVE_HOURS + 1)..(TWELVE_HOURS * 100),
                -(TWELVE_HOURS * 100)..-TWELVE_HOURS,
            ],
            seq in 1u32..20,
        ) {
            let snap: FeedSnapshot = [TripUpdate::new("T1").with_stop_update(StopUpdate {
                stop_sequence: seq,
                arrival: None,
                departure: Some(StopEvent { delay: None, time: Some(SCHEDULED + offset) }),
            })]
            .into_iter()
            .collect();
            let result = RealtimeMatcher::default().match_delay(&snap, "T1", seq, Some(SCHEDULED));
            prop_assert_eq!(result, None);
        }

        /// Any explicit delay, zero included, is reported as present.
        #[test]
        fn explicit_delay_always_present(delay in -3600i32..3600, seq in 1u32..20) {
            let snap: FeedSnapshot = [TripUpdate::new("T1").with_stop_update(StopUpdate {
                stop_sequence: seq,
                arrival: None,
                departure: Some(StopEvent { delay: Some(delay), time: None }),
            })]
            .into_iter()
            .collect();
            let result = RealtimeMatcher::default().match_delay(&snap, "T1", seq, None);
            prop_assert_eq!(result.map(|u| u.delay.seconds), Some(delay));
        }
    }
}
