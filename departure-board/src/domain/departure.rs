//! Departure events, the output of a broadcast cycle.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::{Delay, Direction, RecordError, RouteRef, StopRef, Trip};

/// Format used for instants inside dedup keys.
const KEY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Identity of a departure within one broadcast: `trip_id@instant`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DedupKey(String);

impl DedupKey {
    pub fn new(trip_id: &str, scheduled: NaiveDateTime) -> Self {
        Self(format!("{trip_id}@{}", scheduled.format(KEY_FORMAT)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One upcoming departure of one trip from one stop.
///
/// Instants are local wall-clock times. Built fresh every cycle and not
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureEvent {
    pub stop_id: String,
    pub stop_name: String,
    pub route_id: String,
    pub route_name: String,
    pub trip_id: String,
    pub direction: Option<Direction>,
    pub trip_terminus: String,
    pub stop_sequence: u32,
    pub scheduled: NaiveDateTime,
    pub delay: Option<Delay>,
    key: DedupKey,
}

impl DepartureEvent {
    /// Assemble an event from its schedule records.
    ///
    /// Fails if the trip has no headsign to display.
    pub fn build(
        stop: &StopRef,
        route: &RouteRef,
        trip: &Trip,
        stop_sequence: u32,
        scheduled: NaiveDateTime,
        delay: Option<Delay>,
    ) -> Result<Self, RecordError> {
        let trip_terminus = trip
            .headsign
            .clone()
            .ok_or_else(|| RecordError::MissingField {
                trip_id: trip.trip_id.clone(),
                field: "trip_headsign",
            })?;

        Ok(Self {
            stop_id: stop.stop_id.clone(),
            stop_name: stop.stop_name.clone(),
            route_id: route.route_id.clone(),
            route_name: route.route_long_name.clone(),
            trip_id: trip.trip_id.clone(),
            direction: trip.direction,
            trip_terminus,
            stop_sequence,
            scheduled,
            delay,
            key: DedupKey::new(&trip.trip_id, scheduled),
        })
    }

    pub fn dedup_key(&self) -> &DedupKey {
        &self.key
    }

    /// The delay in seconds, if the trip is tracked live.
    pub fn delay_seconds(&self) -> Option<i32> {
        self.delay.map(|d| d.seconds)
    }

    pub fn is_live(&self) -> bool {
        self.delay.is_some()
    }

    /// Scheduled time plus delay when known, otherwise the scheduled time.
    pub fn effective(&self) -> NaiveDateTime {
        match self.delay {
            Some(delay) => self
                .scheduled
                .checked_add_signed(delay.as_duration())
                .unwrap_or(self.scheduled),
            None => self.scheduled,
        }
    }
}
