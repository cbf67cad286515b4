//! Decoded realtime feed contents.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// A predicted arrival or departure at one stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopEvent {
    /// Explicit delay in seconds.
    pub delay: Option<i32>,
    /// Absolute POSIX time of the event.
    pub time: Option<i64>,
}

/// A stop-level update. Applies to its stop and every later stop until a
/// later update supersedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopUpdate {
    pub stop_sequence: u32,
    pub arrival: Option<StopEvent>,
    pub departure: Option<StopEvent>,
}

/// All realtime information for one trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripUpdate {
    pub trip_id: String,
    /// Trip-level aggregate delay in seconds.
    pub delay: Option<i32>,
    /// Sorted by `stop_sequence`.
    pub stop_updates: Vec<StopUpdate>,
}

impl TripUpdate {
    pub fn new(trip_id: impl Into<String>) -> Self {
        Self {
            trip_id: trip_id.into(),
            delay: None,
            stop_updates: Vec::new(),
        }
    }

    pub fn with_delay(mut self, delay: i32) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_stop_update(mut self, update: StopUpdate) -> Self {
        self.stop_updates.push(update);
        self.stop_updates.sort_by_key(|u| u.stop_sequence);
        self
    }

    /// Fold another update for the same trip into this one.
    ///
    /// Stop updates accumulate; a later trip-level delay wins.
    fn absorb(&mut self, other: TripUpdate) {
        if other.delay.is_some() {
            self.delay = other.delay;
        }
        self.stop_updates.extend(other.stop_updates);
        self.stop_updates.sort_by_key(|u| u.stop_sequence);
    }
}

/// One complete realtime snapshot, keyed by trip id.
///
/// Snapshots are built whole and swapped in; they are never patched.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    trips: HashMap<String, TripUpdate>,
    fetched_at: Option<DateTime<Utc>>,
}

impl FeedSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(fetched_at: DateTime<Utc>) -> Self {
        Self {
            trips: HashMap::new(),
            fetched_at: Some(fetched_at),
        }
    }

    /// Add a trip update, merging with any earlier entity for the same trip.
    pub fn insert(&mut self, update: TripUpdate) {
        match self.trips.get_mut(&update.trip_id) {
            Some(existing) => existing.absorb(update),
            None => {
                self.trips.insert(update.trip_id.clone(), update);
            }
        }
    }

    pub fn trip(&self, trip_id: &str) -> Option<&TripUpdate> {
        self.trips.get(trip_id)
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }
}

impl FromIterator<TripUpdate> for FeedSnapshot {
    fn from_iter<I: IntoIterator<Item = TripUpdate>>(iter: I) -> Self {
        let mut snapshot = FeedSnapshot::empty();
        for update in iter {
            snapshot.insert(update);
        }
        snapshot
    }
}
