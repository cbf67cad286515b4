//! Schedule store interface.
//!
//! The store holds imported static schedule data and answers field-equality
//! lookups. It is not safe to query from two places at once, so the engine
//! owns it behind a single gate.

mod error;
mod filter;
mod memory;

use std::future::Future;

use crate::domain::{Calendar, RouteRef, StopRef, StopTime, Trip};

pub use error::StoreError;
pub use filter::{CalendarFilter, RouteFilter, StopFilter, StopTimeFilter, TripFilter};
pub use memory::{MemoryStore, ScheduleSnapshot, ScheduleSource};

/// Filtered lookups over static schedule data.
///
/// An empty result is a normal answer, not an error.
pub trait ScheduleStore: Send + Sync {
    fn get_routes(
        &self,
        filter: &RouteFilter,
    ) -> impl Future<Output = Result<Vec<RouteRef>, StoreError>> + Send;

    /// Stops matching the filter. With `route_id` set, the stops served by
    /// any trip of that route.
    fn get_stops(
        &self,
        filter: &StopFilter,
    ) -> impl Future<Output = Result<Vec<StopRef>, StoreError>> + Send;

    fn get_trips(
        &self,
        filter: &TripFilter,
    ) -> impl Future<Output = Result<Vec<Trip>, StoreError>> + Send;

    fn get_calendars(
        &self,
        filter: &CalendarFilter,
    ) -> impl Future<Output = Result<Vec<Calendar>, StoreError>> + Send;

    fn get_stop_times(
        &self,
        filter: &StopTimeFilter,
    ) -> impl Future<Output = Result<Vec<StopTime>, StoreError>> + Send;

    /// Re-import the schedule from its source. Stores without a source keep
    /// their current data.
    fn refresh(&mut self) -> impl Future<Output = Result<(), StoreError>> + Send {
        async { Ok(()) }
    }
}
