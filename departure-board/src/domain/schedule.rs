//! Static schedule records as returned by the schedule store.
//!
//! Identifiers and labels are carried verbatim; nothing here is normalised.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::{ClockTime, Direction};

/// A boarding location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StopRef {
    pub stop_id: String,
    pub stop_name: String,
}

impl StopRef {
    pub fn new(stop_id: impl Into<String>, stop_name: impl Into<String>) -> Self {
        Self {
            stop_id: stop_id.into(),
            stop_name: stop_name.into(),
        }
    }
}

/// A named transit line.
///
/// `route_id` doubles as the short identifier shown to riders.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RouteRef {
    pub route_id: String,
    pub route_long_name: String,
}

impl RouteRef {
    pub fn new(route_id: impl Into<String>, route_long_name: impl Into<String>) -> Self {
        Self {
            route_id: route_id.into(),
            route_long_name: route_long_name.into(),
        }
    }
}

/// One scheduled run of a route.
///
/// `direction` and `headsign` are optional in GTFS feeds. A trip without a
/// headsign cannot be shown on a board and is dropped during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: String,
    pub route_id: String,
    pub service_id: String,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub headsign: Option<String>,
}

/// Weekly service pattern for a `service_id`.
///
/// Start/end dates and exception dates are not modelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub service_id: String,
    /// Active flags, Monday first.
    pub days: [bool; 7],
}

impl Calendar {
    pub fn new(service_id: impl Into<String>, days: [bool; 7]) -> Self {
        Self {
            service_id: service_id.into(),
            days,
        }
    }

    /// Monday to Friday.
    pub fn weekdays(service_id: impl Into<String>) -> Self {
        Self::new(service_id, [true, true, true, true, true, false, false])
    }

    pub fn every_day(service_id: impl Into<String>) -> Self {
        Self::new(service_id, [true; 7])
    }

    pub fn runs_on(&self, weekday: Weekday) -> bool {
        self.days[weekday.num_days_from_monday() as usize]
    }
}

/// When a trip serves a stop, and where the stop falls along the trip.
///
/// GTFS leaves `departure_time` blank for untimed stops; such rows have no
/// departure to show.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StopTime {
    pub trip_id: String,
    pub stop_id: String,
    pub stop_sequence: u32,
    #[serde(default)]
    pub departure_time: Option<ClockTime>,
}
