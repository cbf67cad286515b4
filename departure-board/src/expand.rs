//! Schedule expansion.
//!
//! Places a trip's clock time at a stop onto concrete upcoming days,
//! according to the trip's weekly calendar.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::{debug, trace};

use crate::domain::{Calendar, ClockTime, RecordError, StopRef, Trip};
use crate::store::{CalendarFilter, ScheduleStore, StopTimeFilter, StoreError};

/// The departures of one trip from one stop within the lookahead window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub stop_sequence: u32,
    pub instants: Vec<NaiveDateTime>,
}

/// Instants for `clock` on each of `days` service days starting at `today`,
/// keeping only days the calendar runs.
///
/// Each service day is tested against the calendar; a time past 24:00 still
/// belongs to the day it was scheduled on. Returns `None` if any running
/// day's instant falls outside the representable date range.
pub fn service_instants(
    clock: ClockTime,
    calendar: &Calendar,
    today: NaiveDate,
    days: u32,
) -> Option<Vec<NaiveDateTime>> {
    today
        .iter_days()
        .take(days as usize)
        .filter(|day| calendar.runs_on(day.weekday()))
        .map(|day| clock.on(day))
        .collect()
}

/// Expand `trip` at `stop` over the lookahead window.
///
/// Returns `Ok(None)` when the trip does not serve the stop or its service
/// id has no calendar. A stop time without a departure time, or one that
/// cannot be placed on a service day, is a malformed record and comes back
/// as [`ExpandError::Record`].
pub async fn expand<S: ScheduleStore>(
    store: &S,
    trip: &Trip,
    stop: &StopRef,
    today: NaiveDate,
    days: u32,
) -> Result<Option<Expansion>, ExpandError> {
    let stop_times = store
        .get_stop_times(&StopTimeFilter::at(&trip.trip_id, &stop.stop_id))
        .await?;
    let Some(stop_time) = stop_times.into_iter().next() else {
        trace!(trip_id = %trip.trip_id, stop_id = %stop.stop_id, "trip does not serve stop");
        return Ok(None);
    };

    let calendars = store
        .get_calendars(&CalendarFilter::by_service(&trip.service_id))
        .await?;
    let Some(calendar) = calendars.into_iter().next() else {
        debug!(
            trip_id = %trip.trip_id,
            service_id = %trip.service_id,
            "service id has no calendar, skipping trip"
        );
        return Ok(None);
    };

    let clock = stop_time.departure_time.ok_or_else(|| RecordError::MissingField {
        trip_id: trip.trip_id.clone(),
        field: "departure_time",
    })?;

    let instants = service_instants(clock, &calendar, today, days).ok_or_else(|| {
        RecordError::TimeOutOfRange {
            trip_id: trip.trip_id.clone(),
        }
    })?;

    Ok(Some(Expansion {
        stop_sequence: stop_time.stop_sequence,
        instants,
    }))
}

/// Why a single expansion failed.
#[derive(Debug, thiserror::Error)]
pub enum ExpandError {
    /// The store itself failed; the cycle cannot continue.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// One record is unusable; skip it.
    #[error(transparent)]
    Record(#[from] RecordError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopTime;
    use crate::store::{MemoryStore, ScheduleSnapshot};

    /// 2024-03-12 is a Tuesday.
    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()
    }

    fn clock(s: &str) -> ClockTime {
        ClockTime::parse(s).unwrap()
    }

    #[test]
    fn weekday_calendar_two_days() {
        let instants = service_instants(clock("09:15:00"), &Calendar::weekdays("WK"), tuesday(), 2).unwrap();
        assert_eq!(
            instants,
            vec![
                tuesday().and_hms_opt(9, 15, 0).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 13)
                    .unwrap()
                    .and_hms_opt(9, 15, 0)
                    .unwrap(),
            ]
        );
    }

    #[test]
    fn inactive_days_skipped() {
        // Friday then Saturday: only Friday runs.
        let friday = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let instants = service_instants(clock("09:15:00"), &Calendar::weekdays("WK"), friday, 2).unwrap();
        assert_eq!(instants, vec![friday.and_hms_opt(9, 15, 0).unwrap()]);
    }

    #[test]
    fn window_is_tunable() {
        let cal = Calendar::every_day("ALL");
        let count = |days| service_instants(clock("09:15:00"), &cal, tuesday(), days).unwrap().len();
        assert_eq!(count(0), 0);
        assert_eq!(count(1), 1);
        assert_eq!(count(7), 7);
    }

    #[test]
    fn past_midnight_uses_service_day() {
        // Friday-only service at 25:30 departs Saturday 01:30.
        let friday = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let cal = Calendar::new("FRI", [false, false, false, false, true, false, false]);
        let instants = service_instants(clock("25:30:00"), &cal, friday, 2).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
        assert_eq!(instants, vec![saturday.and_hms_opt(1, 30, 0).unwrap()]);
    }

    #[test]
    fn unrepresentable_instant_is_none() {
        let cal = Calendar::every_day("ALL");
        assert_eq!(service_instants(clock("25:00:00"), &cal, NaiveDate::MAX, 1), None);
    }

    fn trip(service_id: &str) -> Trip {
        Trip {
            trip_id: "T1".into(),
            route_id: "49".into(),
            service_id: service_id.into(),
            direction: None,
            headsign: Some("Downtown".into()),
        }
    }

    fn store(departure: Option<&str>) -> MemoryStore {
        MemoryStore::from_snapshot(ScheduleSnapshot {
            calendars: vec![Calendar::weekdays("WK"), Calendar::every_day("ALL")],
            stop_times: vec![StopTime {
                trip_id: "T1".into(),
                stop_id: "S1".into(),
                stop_sequence: 3,
                departure_time: departure.map(clock),
            }],
            ..ScheduleSnapshot::default()
        })
    }

    #[tokio::test]
    async fn expands_served_stop() {
        let stop = StopRef::new("S1", "Main St & 3rd");
        let expansion = expand(&store(Some("09:15:00")), &trip("WK"), &stop, tuesday(), 2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(expansion.stop_sequence, 3);
        assert_eq!(expansion.instants.len(), 2);
    }

    #[tokio::test]
    async fn unserved_stop_is_pruned() {
        let stop = StopRef::new("S2", "Main St & 5th");
        let result = expand(&store(Some("09:15:00")), &trip("WK"), &stop, tuesday(), 2)
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn undefined_calendar_is_pruned() {
        let stop = StopRef::new("S1", "Main St & 3rd");
        let result = expand(&store(Some("09:15:00")), &trip("UNDEFINED"), &stop, tuesday(), 2)
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn missing_departure_time_is_record_error() {
        let stop = StopRef::new("S1", "Main St & 3rd");
        let err = expand(&store(None), &trip("WK"), &stop, tuesday(), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, ExpandError::Record(_)));
    }

    #[tokio::test]
    async fn out_of_range_time_is_record_error() {
        let stop = StopRef::new("S1", "Main St & 3rd");
        let err = expand(&store(Some("25:00:00")), &trip("ALL"), &stop, NaiveDate::MAX, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExpandError::Record(RecordError::TimeOutOfRange { ref trip_id }) if trip_id == "T1"
        ));
    }
}
