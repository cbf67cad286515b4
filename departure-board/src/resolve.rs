//! Query resolution.
//!
//! Turns a `Query` into the concrete stops and routes it watches. This runs
//! once per registration; broadcasts only ever see the resolved form.

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::{Query, ResolvedQuery};
use crate::store::{RouteFilter, ScheduleStore, StopFilter, StoreError};

/// Resolve a query against the schedule store.
///
/// A route is kept only if at least one of its stops matches the stop name.
/// Direction is carried through and applied per trip at broadcast time.
/// Matching nothing is not an error.
pub async fn resolve_query<S: ScheduleStore>(
    store: &S,
    query: &Query,
) -> Result<ResolvedQuery, StoreError> {
    let mut stops = BTreeSet::new();
    let mut routes = BTreeSet::new();

    let all_routes = store.get_routes(&RouteFilter::all()).await?;

    for route in all_routes.into_iter().filter(|r| query.matches_route(r)) {
        let served = store.get_stops(&StopFilter::by_route(&route.route_id)).await?;

        let mut any_stop = false;
        for stop in served.into_iter().filter(|s| query.matches_stop(s)) {
            any_stop = true;
            stops.insert(stop);
        }

        if any_stop {
            routes.insert(route);
        } else {
            debug!(route_id = %route.route_id, "route matched by name but serves no matching stop");
        }
    }

    debug!(
        ?query,
        stops = stops.len(),
        routes = routes.len(),
        "resolved query"
    );

    Ok(ResolvedQuery {
        query: query.clone(),
        stops,
        routes,
        direction: query.direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClockTime, Direction, RouteRef, StopRef, StopTime, Trip};
    use crate::store::{MemoryStore, ScheduleSnapshot};

    fn trip(trip_id: &str, route_id: &str) -> Trip {
        Trip {
            trip_id: trip_id.into(),
            route_id: route_id.into(),
            service_id: "WK".into(),
            direction: Some(Direction::Outbound),
            headsign: Some("Downtown".into()),
        }
    }

    fn stop_time(trip_id: &str, stop_id: &str, seq: u32) -> StopTime {
        StopTime {
            trip_id: trip_id.into(),
            stop_id: stop_id.into(),
            stop_sequence: seq,
            departure_time: ClockTime::parse("09:00:00").ok(),
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::from_snapshot(ScheduleSnapshot {
            routes: vec![
                RouteRef::new("49", "Cross Town"),
                RouteRef::new("149", "Airport Express"),
                RouteRef::new("53", "Wayne Ave"),
            ],
            stops: vec![
                StopRef::new("S1", "Main St & 3rd"),
                StopRef::new("S2", "Main St & 5th"),
                StopRef::new("S3", "Wayne & Walnut"),
                StopRef::new("S4", "Airport Terminal A"),
            ],
            trips: vec![trip("T1", "49"), trip("T2", "149"), trip("T3", "53")],
            calendars: vec![],
            stop_times: vec![
                stop_time("T1", "S1", 1),
                stop_time("T1", "S2", 2),
                stop_time("T2", "S4", 1),
                stop_time("T3", "S3", 1),
                stop_time("T3", "S1", 2),
            ],
        })
    }

    fn ids<'a>(items: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
        items.collect()
    }

    #[tokio::test]
    async fn route_and_stop_substrings() {
        let resolved = resolve_query(&store(), &Query::new(Some("49"), Some("Main St")))
            .await
            .unwrap();

        // "149" contains "49" but serves no "Main St" stop.
        assert_eq!(ids(resolved.routes.iter().map(|r| r.route_id.as_str())), vec!["49"]);
        assert_eq!(
            ids(resolved.stops.iter().map(|s| s.stop_id.as_str())),
            vec!["S1", "S2"]
        );
    }

    #[tokio::test]
    async fn long_name_match() {
        let resolved = resolve_query(&store(), &Query::new(Some("Wayne"), None))
            .await
            .unwrap();
        assert_eq!(ids(resolved.routes.iter().map(|r| r.route_id.as_str())), vec!["53"]);
        assert_eq!(
            ids(resolved.stops.iter().map(|s| s.stop_id.as_str())),
            vec!["S1", "S3"]
        );
    }

    #[tokio::test]
    async fn stop_only_query_spans_routes() {
        let resolved = resolve_query(&store(), &Query::new(None, Some("Main St & 3rd")))
            .await
            .unwrap();
        assert_eq!(
            ids(resolved.routes.iter().map(|r| r.route_id.as_str())),
            vec!["49", "53"]
        );
        assert_eq!(ids(resolved.stops.iter().map(|s| s.stop_id.as_str())), vec!["S1"]);
    }

    #[tokio::test]
    async fn no_match_is_empty_not_error() {
        let resolved = resolve_query(&store(), &Query::new(Some("999"), None))
            .await
            .unwrap();
        assert!(resolved.is_empty());
        assert!(resolved.routes.is_empty());
        assert!(resolved.stops.is_empty());
    }

    #[tokio::test]
    async fn direction_is_carried() {
        let query = Query::new(Some("49"), None).with_direction(Direction::Inbound);
        let resolved = resolve_query(&store(), &query).await.unwrap();
        assert_eq!(resolved.direction, Some(Direction::Inbound));
        assert_eq!(resolved.query, query);
    }
}
