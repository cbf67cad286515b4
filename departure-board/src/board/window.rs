//! Departed-train filter.

use chrono::{Duration, NaiveDateTime};

use crate::domain::DepartureEvent;

/// Drop events whose effective time is more than `grace` before `now`.
///
/// Events within the grace period and all future events are kept. A grace
/// reaching past the start of the calendar keeps everything.
pub fn drop_departed(
    mut events: Vec<DepartureEvent>,
    now: NaiveDateTime,
    grace: Duration,
) -> Vec<DepartureEvent> {
    let Some(cutoff) = now.checked_sub_signed(grace) else {
        return events;
    };
    events.retain(|e| e.effective() >= cutoff);
    events
}
