//! Data transfer objects for web requests and responses.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::board::{Board, TimeDisplay};
use crate::domain::{DelaySource, DepartureEvent, Direction, Query};

/// Request to add watches.
#[derive(Debug, Deserialize)]
pub struct WatchRequest {
    pub queries: Vec<Query>,
}

/// Result of adding watches.
#[derive(Debug, Serialize)]
pub struct WatchResponse {
    /// Total watches now registered
    pub watches: usize,

    /// Departures on the board broadcast after registering
    pub departures: usize,
}

/// One row of the board.
#[derive(Debug, Serialize)]
pub struct DepartureDto {
    pub stop_id: String,
    pub stop_name: String,
    pub route_id: String,
    pub route_name: String,
    pub trip_id: String,
    pub direction: Option<Direction>,

    /// Trip headsign
    pub terminus: String,

    pub stop_sequence: u32,

    /// Timetabled departure, local time
    pub scheduled: NaiveDateTime,

    /// Scheduled plus delay; only present for live trips
    pub estimated: Option<NaiveDateTime>,

    /// Signed delay in seconds; absent when the trip is not tracked
    pub delay_seconds: Option<i32>,

    pub delay_source: Option<DelaySource>,

    /// Whether realtime data was matched, including a zero delay
    pub live: bool,

    /// "HH:MM" in the board's time display mode
    pub display_time: String,

    /// Whole minutes from board generation to the effective departure
    pub minutes_until: i64,
}

impl DepartureDto {
    /// Create from a departure on a board generated at `now`.
    pub fn from_event(event: &DepartureEvent, now: NaiveDateTime, mode: TimeDisplay) -> Self {
        let effective = event.effective();
        let shown = match mode {
            TimeDisplay::Scheduled => event.scheduled,
            TimeDisplay::Estimated => effective,
        };

        Self {
            stop_id: event.stop_id.clone(),
            stop_name: event.stop_name.clone(),
            route_id: event.route_id.clone(),
            route_name: event.route_name.clone(),
            trip_id: event.trip_id.clone(),
            direction: event.direction,
            terminus: event.trip_terminus.clone(),
            stop_sequence: event.stop_sequence,
            scheduled: event.scheduled,
            estimated: event.is_live().then_some(effective),
            delay_seconds: event.delay_seconds(),
            delay_source: event.delay.map(|d| d.source),
            live: event.is_live(),
            display_time: shown.format("%H:%M").to_string(),
            minutes_until: (effective - now).num_minutes(),
        }
    }
}

/// The latest board.
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub generated_at: NaiveDateTime,
    pub departures: Vec<DepartureDto>,
}

impl BoardResponse {
    pub fn from_board(board: &Board, mode: TimeDisplay) -> Self {
        Self {
            generated_at: board.generated_at,
            departures: board
                .departures
                .iter()
                .map(|e| DepartureDto::from_event(e, board.generated_at, mode))
                .collect(),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
