//! In-memory schedule store backed by a JSON snapshot file.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Calendar, RouteRef, StopRef, StopTime, Trip};

use super::ScheduleStore;
use super::error::StoreError;
use super::filter::{CalendarFilter, RouteFilter, StopFilter, StopTimeFilter, TripFilter};

/// Where the schedule snapshot is imported from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSource {
    pub path: PathBuf,
}

impl ScheduleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Every schedule table, as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    #[serde(default)]
    pub routes: Vec<RouteRef>,
    #[serde(default)]
    pub stops: Vec<StopRef>,
    #[serde(default)]
    pub trips: Vec<Trip>,
    #[serde(default)]
    pub calendars: Vec<Calendar>,
    #[serde(default)]
    pub stop_times: Vec<StopTime>,
}

impl ScheduleSnapshot {
    /// Read a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| StoreError::Snapshot {
            message: format!("{}: {}", path.display(), e),
        })
    }

    /// Write a snapshot as JSON, creating parent directories as needed.
    #[cfg(test)]
    pub(crate) fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| StoreError::Snapshot {
            message: format!("failed to serialize snapshot: {}", e),
        })?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Schedule store holding a whole snapshot in memory.
///
/// Stop times are indexed by trip, and route → stop membership is
/// precomputed so `get_stops` by route is a lookup.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: ScheduleSnapshot,
    stop_times_by_trip: HashMap<String, Vec<usize>>,
    stops_by_route: HashMap<String, BTreeSet<String>>,
    source: Option<ScheduleSource>,
}

impl MemoryStore {
    /// Build a store from an in-memory snapshot. `refresh` is a no-op.
    pub fn from_snapshot(snapshot: ScheduleSnapshot) -> Self {
        let mut store = Self::default();
        store.replace(snapshot);
        store
    }

    /// Import a store from its source file.
    ///
    /// This is the initial import; failure here means no departures can be
    /// produced at all.
    pub fn load(source: &ScheduleSource) -> Result<Self, StoreError> {
        let snapshot = ScheduleSnapshot::load(&source.path)?;
        let mut store = Self::from_snapshot(snapshot);
        store.source = Some(source.clone());
        info!(
            path = %source.path.display(),
            routes = store.snapshot.routes.len(),
            trips = store.snapshot.trips.len(),
            "imported schedule snapshot"
        );
        Ok(store)
    }

    fn replace(&mut self, snapshot: ScheduleSnapshot) {
        let mut stop_times_by_trip: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, st) in snapshot.stop_times.iter().enumerate() {
            stop_times_by_trip
                .entry(st.trip_id.clone())
                .or_default()
                .push(idx);
        }

        let mut stops_by_route: HashMap<String, BTreeSet<String>> = HashMap::new();
        for trip in &snapshot.trips {
            let Some(indices) = stop_times_by_trip.get(&trip.trip_id) else {
                continue;
            };
            let served = stops_by_route.entry(trip.route_id.clone()).or_default();
            for &idx in indices {
                served.insert(snapshot.stop_times[idx].stop_id.clone());
            }
        }

        self.snapshot = snapshot;
        self.stop_times_by_trip = stop_times_by_trip;
        self.stops_by_route = stops_by_route;
    }
}

impl ScheduleStore for MemoryStore {
    async fn get_routes(&self, filter: &RouteFilter) -> Result<Vec<RouteRef>, StoreError> {
        Ok(self
            .snapshot
            .routes
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn get_stops(&self, filter: &StopFilter) -> Result<Vec<StopRef>, StoreError> {
        let served = match &filter.route_id {
            Some(route_id) => match self.stops_by_route.get(route_id) {
                Some(ids) => Some(ids),
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        Ok(self
            .snapshot
            .stops
            .iter()
            .filter(|s| filter.matches_stop(s))
            .filter(|s| served.is_none_or(|ids| ids.contains(&s.stop_id)))
            .cloned()
            .collect())
    }

    async fn get_trips(&self, filter: &TripFilter) -> Result<Vec<Trip>, StoreError> {
        Ok(self
            .snapshot
            .trips
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn get_calendars(&self, filter: &CalendarFilter) -> Result<Vec<Calendar>, StoreError> {
        Ok(self
            .snapshot
            .calendars
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn get_stop_times(&self, filter: &StopTimeFilter) -> Result<Vec<StopTime>, StoreError> {
        let rows: Vec<StopTime> = match &filter.trip_id {
            Some(trip_id) => self
                .stop_times_by_trip
                .get(trip_id)
                .map(|indices| {
                    indices
                        .iter()
                        .map(|&idx| &self.snapshot.stop_times[idx])
                        .filter(|st| filter.matches(st))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default(),
            None => self
                .snapshot
                .stop_times
                .iter()
                .filter(|st| filter.matches(st))
                .cloned()
                .collect(),
        };

        Ok(rows)
    }

    async fn refresh(&mut self) -> Result<(), StoreError> {
        let Some(source) = &self.source else {
            debug!("schedule store has no source, skipping refresh");
            return Ok(());
        };
        let snapshot = ScheduleSnapshot::load(&source.path)?;
        self.replace(snapshot);
        info!(
            routes = self.snapshot.routes.len(),
            trips = self.snapshot.trips.len(),
            "refreshed schedule snapshot"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClockTime;
    use tempfile::tempdir;

    fn snapshot() -> ScheduleSnapshot {
        ScheduleSnapshot {
            routes: vec![
                RouteRef::new("49", "Cross Town"),
                RouteRef::new("53", "Wayne Ave"),
            ],
            stops: vec![
                StopRef::new("S1", "Main St & 3rd"),
                StopRef::new("S2", "Main St & 5th"),
                StopRef::new("S3", "Wayne & Walnut"),
            ],
            trips: vec![
                Trip {
                    trip_id: "T1".into(),
                    route_id: "49".into(),
                    service_id: "WK".into(),
                    direction: None,
                    headsign: Some("Downtown".into()),
                },
                Trip {
                    trip_id: "T2".into(),
                    route_id: "53".into(),
                    service_id: "WK".into(),
                    direction: None,
                    headsign: Some("Wayne Junction".into()),
                },
            ],
            calendars: vec![Calendar::weekdays("WK")],
            stop_times: vec![
                StopTime {
                    trip_id: "T1".into(),
                    stop_id: "S1".into(),
                    stop_sequence: 1,
                    departure_time: ClockTime::parse("09:00:00").ok(),
                },
                StopTime {
                    trip_id: "T1".into(),
                    stop_id: "S2".into(),
                    stop_sequence: 2,
                    departure_time: ClockTime::parse("09:05:00").ok(),
                },
                StopTime {
                    trip_id: "T2".into(),
                    stop_id: "S3".into(),
                    stop_sequence: 1,
                    departure_time: ClockTime::parse("10:00:00").ok(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn stops_by_route_join() {
        let store = MemoryStore::from_snapshot(snapshot());

        let stops = store.get_stops(&StopFilter::by_route("49")).await.unwrap();
        let ids: Vec<_> = stops.iter().map(|s| s.stop_id.as_str()).collect();
        assert_eq!(ids, vec!["S1", "S2"]);

        let stops = store.get_stops(&StopFilter::by_route("99")).await.unwrap();
        assert!(stops.is_empty());
    }

    #[tokio::test]
    async fn stop_times_by_trip_and_stop() {
        let store = MemoryStore::from_snapshot(snapshot());

        let rows = store
            .get_stop_times(&StopTimeFilter::at("T1", "S2"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].stop_sequence, 2);

        let rows = store
            .get_stop_times(&StopTimeFilter::at("T1", "S3"))
            .await
            .unwrap();
        assert!(rows.is_empty());

        let all = store
            .get_stop_times(&StopTimeFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn calendars_by_service() {
        let store = MemoryStore::from_snapshot(snapshot());
        let found = store
            .get_calendars(&CalendarFilter::by_service("WK"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        let missing = store
            .get_calendars(&CalendarFilter::by_service("HOLIDAY"))
            .await
            .unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn load_and_refresh_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("schedule.json");
        let mut snap = snapshot();
        snap.save(&path).unwrap();

        let mut store = MemoryStore::load(&ScheduleSource::new(&path)).unwrap();
        assert_eq!(store.snapshot.routes.len(), 2);

        snap.routes.push(RouteRef::new("65", "Germantown"));
        snap.save(&path).unwrap();
        store.refresh().await.unwrap();
        assert_eq!(store.snapshot.routes.len(), 3);
    }

    #[test]
    fn missing_file_is_error() {
        let err = MemoryStore::load(&ScheduleSource::new("/nonexistent/schedule.json")).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn invalid_json_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = MemoryStore::load(&ScheduleSource::new(&path)).unwrap_err();
        assert!(matches!(err, StoreError::Snapshot { .. }));
    }
}
