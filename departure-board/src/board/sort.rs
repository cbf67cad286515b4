//! Board ordering.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{DepartureEvent, Direction};

use super::collate::CollationKey;

/// Which instant the time column shows, and so which one orders the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeDisplay {
    /// Timetabled instant.
    #[default]
    Scheduled,
    /// Timetabled instant plus delay, when a delay is known.
    Estimated,
}

/// Which columns take part in ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOptions {
    pub time_display: TimeDisplay,
    /// When off, stops interleave by time.
    pub by_stop_name: bool,
    /// When off, a route's termini interleave by time.
    pub by_terminus: bool,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            time_display: TimeDisplay::Scheduled,
            by_stop_name: true,
            by_terminus: true,
        }
    }
}

type SortKey = (
    Option<CollationKey>,
    CollationKey,
    Option<Direction>,
    Option<CollationKey>,
    NaiveDateTime,
);

fn sort_key(event: &DepartureEvent, opts: &SortOptions) -> SortKey {
    let instant = match opts.time_display {
        TimeDisplay::Scheduled => event.scheduled,
        TimeDisplay::Estimated => event.effective(),
    };

    (
        opts.by_stop_name.then(|| CollationKey::new(&event.stop_name)),
        CollationKey::new(&event.route_id),
        event.direction,
        opts.by_terminus.then(|| CollationKey::new(&event.trip_terminus)),
        instant,
    )
}

/// Order departures by stop, route, direction, terminus, then time.
///
/// Stable: events with equal keys keep their input order.
pub fn sort_departures(mut events: Vec<DepartureEvent>, opts: &SortOptions) -> Vec<DepartureEvent> {
    events.sort_by_cached_key(|e| sort_key(e, opts));
    events
}


#[cfg(test)]
mod proptests {
    use super::tests::event;
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn events_strategy() -> impl Strategy<Value = Vec<DepartureEvent>> {
        prop::collection::vec(
            (0usize..3, 0usize..3, 0usize..2, 0u32..6, prop::option::of(-300i32..900)),
            0..15,
        )
        .prop_map(|rows| {
            let stops = ["Main St & 3rd", "Main St & 10th", "Arch St"];
            let routes = ["9", "10", "49"];
            let termini = ["Downtown", "Airport"];
            let day = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
            rows.into_iter()
                .enumerate()
                .map(|(i, (s, r, t, slot, delay))| {
                    let scheduled = day.and_hms_opt(9, slot * 10, 0).unwrap();
                    event(stops[s], routes[r], termini[t], &format!("T{i}"), scheduled, delay)
                })
                .collect()
        })
    }

    fn options_strategy() -> impl Strategy<Value = SortOptions> {
        (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(estimated, by_stop_name, by_terminus)| {
            SortOptions {
                time_display: if estimated {
                    TimeDisplay::Estimated
                } else {
                    TimeDisplay::Scheduled
                },
                by_stop_name,
                by_terminus,
            }
        })
    }

    proptest! {
        #[test]
        fn resort_is_noop(events in events_strategy(), opts in options_strategy()) {
            let once = sort_departures(events, &opts);
            let twice = sort_departures(once.clone(), &opts);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn keys_are_non_decreasing(events in events_strategy(), opts in options_strategy()) {
            let sorted = sort_departures(events, &opts);
            for pair in sorted.windows(2) {
                prop_assert!(sort_key(&pair[0], &opts) <= sort_key(&pair[1], &opts));
            }
        }

        #[test]
        fn ties_keep_input_order(events in events_strategy(), opts in options_strategy()) {
            // Trip ids encode input position.
            let position = |e: &DepartureEvent| e.trip_id[1..].parse::<usize>().unwrap();
            let sorted = sort_departures(events, &opts);
            for pair in sorted.windows(2) {
                if sort_key(&pair[0], &opts) == sort_key(&pair[1], &opts) {
                    prop_assert!(position(&pair[0]) < position(&pair[1]));
                }
            }
        }

        #[test]
        fn sort_is_permutation(events in events_strategy(), opts in options_strategy()) {
            let mut before: Vec<String> = events.iter().map(|e| e.trip_id.clone()).collect();
            let mut after: Vec<String> = sort_departures(events, &opts)
                .iter()
                .map(|e| e.trip_id.clone())
                .collect();
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
        }
    }
}
