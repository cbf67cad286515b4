//! Typed lookup filters.
//!
//! Every field is an equality predicate; `None` leaves that field
//! unconstrained. `Default` is "match everything".

use crate::domain::{Calendar, RouteRef, StopRef, StopTime, Trip};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteFilter {
    pub route_id: Option<String>,
}

impl RouteFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, route: &RouteRef) -> bool {
        field_matches(&self.route_id, &route.route_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopFilter {
    pub stop_id: Option<String>,
    /// Restrict to stops served by this route.
    pub route_id: Option<String>,
}

impl StopFilter {
    pub fn by_route(route_id: impl Into<String>) -> Self {
        Self {
            stop_id: None,
            route_id: Some(route_id.into()),
        }
    }

    /// Checks the stop's own fields only; route membership is a join the
    /// store resolves.
    pub fn matches_stop(&self, stop: &StopRef) -> bool {
        field_matches(&self.stop_id, &stop.stop_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripFilter {
    pub trip_id: Option<String>,
    pub route_id: Option<String>,
    pub service_id: Option<String>,
}

impl TripFilter {
    pub fn by_route(route_id: impl Into<String>) -> Self {
        Self {
            route_id: Some(route_id.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, trip: &Trip) -> bool {
        field_matches(&self.trip_id, &trip.trip_id)
            && field_matches(&self.route_id, &trip.route_id)
            && field_matches(&self.service_id, &trip.service_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarFilter {
    pub service_id: Option<String>,
}

impl CalendarFilter {
    pub fn by_service(service_id: impl Into<String>) -> Self {
        Self {
            service_id: Some(service_id.into()),
        }
    }

    pub fn matches(&self, calendar: &Calendar) -> bool {
        field_matches(&self.service_id, &calendar.service_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopTimeFilter {
    pub trip_id: Option<String>,
    pub stop_id: Option<String>,
}

impl StopTimeFilter {
    pub fn at(trip_id: impl Into<String>, stop_id: impl Into<String>) -> Self {
        Self {
            trip_id: Some(trip_id.into()),
            stop_id: Some(stop_id.into()),
        }
    }

    pub fn matches(&self, stop_time: &StopTime) -> bool {
        field_matches(&self.trip_id, &stop_time.trip_id)
            && field_matches(&self.stop_id, &stop_time.stop_id)
    }
}

fn field_matches(wanted: &Option<String>, actual: &str) -> bool {
    wanted.as_deref().is_none_or(|w| w == actual)
}
