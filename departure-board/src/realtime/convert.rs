//! Conversion from wire types to feed snapshots.
//!
//! Entities that cannot be matched against the schedule are skipped here:
//! trip updates without a trip id, and stop updates without a stop
//! sequence.

use chrono::{DateTime, Utc};
use tracing::trace;

use super::feed::{FeedSnapshot, StopEvent, StopUpdate, TripUpdate};
use super::types::{FeedMessage, StopTimeEventDto, StopTimeUpdateDto, TripDelayDto, TripUpdateDto};

/// Build one snapshot from every message of a GTFS-Realtime fetch.
pub fn snapshot_from_messages(messages: Vec<FeedMessage>, fetched_at: DateTime<Utc>) -> FeedSnapshot {
    let mut snapshot = FeedSnapshot::new(fetched_at);

    for entity in messages.into_iter().flat_map(|m| m.entity) {
        let Some(trip_update) = entity.trip_update else {
            continue;
        };
        match convert_trip_update(trip_update) {
            Some(update) => snapshot.insert(update),
            None => trace!(entity = ?entity.id, "trip update without trip_id, skipping"),
        }
    }

    snapshot
}

/// Build a snapshot from a polling delay feed. Every row becomes a
/// trip-level delay.
pub fn snapshot_from_trip_delays(rows: Vec<TripDelayDto>, fetched_at: DateTime<Utc>) -> FeedSnapshot {
    let mut snapshot = FeedSnapshot::new(fetched_at);
    for row in rows {
        snapshot.insert(TripUpdate::new(row.trip_id).with_delay(row.delay_minutes.saturating_mul(60)));
    }
    snapshot
}

fn convert_trip_update(dto: TripUpdateDto) -> Option<TripUpdate> {
    let trip_id = dto.trip.trip_id.filter(|id| !id.is_empty())?;

    let mut stop_updates: Vec<StopUpdate> = dto
        .stop_time_update
        .into_iter()
        .filter_map(|stu| convert_stop_update(&trip_id, stu))
        .collect();
    stop_updates.sort_by_key(|u| u.stop_sequence);

    Some(TripUpdate {
        trip_id,
        delay: dto.delay,
        stop_updates,
    })
}

fn convert_stop_update(trip_id: &str, dto: StopTimeUpdateDto) -> Option<StopUpdate> {
    let Some(stop_sequence) = dto.stop_sequence else {
        trace!(trip_id, stop_id = ?dto.stop_id, "stop update without stop_sequence, skipping");
        return None;
    };

    Some(StopUpdate {
        stop_sequence,
        arrival: dto.arrival.and_then(convert_event),
        departure: dto.departure.and_then(convert_event),
    })
}

/// An event with neither field carries no information.
fn convert_event(dto: StopTimeEventDto) -> Option<StopEvent> {
    if dto.delay.is_none() && dto.time.is_none() {
        return None;
    }
    Some(StopEvent {
        delay: dto.delay,
        time: dto.time,
    })
}
