//! Assembling a departure board from expanded events.
//!
//! Events from every watch go into one [`Aggregator`], which keeps a single
//! event per trip and scheduled instant. [`Aggregator::finish`] then drops
//! departed trains and orders the rest.

mod collate;
mod sort;
mod window;

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};

use crate::domain::{DedupKey, DepartureEvent};

pub use collate::CollationKey;
pub use sort::{SortOptions, TimeDisplay, sort_departures};
pub use window::drop_departed;

/// One broadcast's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Local time the cycle ran at.
    pub generated_at: NaiveDateTime,
    pub departures: Vec<DepartureEvent>,
}

impl Board {
    pub fn empty(generated_at: NaiveDateTime) -> Self {
        Self {
            generated_at,
            departures: Vec::new(),
        }
    }
}

/// Collects departures keyed by trip and scheduled instant.
///
/// Inserting a key that is already present replaces the earlier event in
/// place.
#[derive(Debug, Default)]
pub struct Aggregator {
    events: Vec<DepartureEvent>,
    index: HashMap<DedupKey, usize>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the key was new.
    pub fn insert(&mut self, event: DepartureEvent) -> bool {
        match self.index.get(event.dedup_key()) {
            Some(&slot) => {
                self.events[slot] = event;
                false
            }
            None => {
                self.index.insert(event.dedup_key().clone(), self.events.len());
                self.events.push(event);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop departed trains and sort what is left.
    pub fn finish(self, now: NaiveDateTime, grace: Duration, opts: &SortOptions) -> Vec<DepartureEvent> {
        let upcoming = drop_departed(self.events, now, grace);
        sort_departures(upcoming, opts)
    }
}

impl Extend<DepartureEvent> for Aggregator {
    fn extend<I: IntoIterator<Item = DepartureEvent>>(&mut self, iter: I) {
        for event in iter {
            self.insert(event);
        }
    }
}
