//! Watch queries and their resolved form.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Direction, RouteRef, StopRef};

/// A user-declared watch: which route(s), at which stop(s), which way.
///
/// Name fields are case-sensitive substrings. An unset field matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub route_name: Option<String>,
    #[serde(default)]
    pub stop_name: Option<String>,
    #[serde(default)]
    pub direction: Option<Direction>,
}

impl Query {
    pub fn new(route_name: Option<&str>, stop_name: Option<&str>) -> Self {
        Self {
            route_name: route_name.map(str::to_string),
            stop_name: stop_name.map(str::to_string),
            direction: None,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Matches against either the short identifier or the long name.
    pub fn matches_route(&self, route: &RouteRef) -> bool {
        match &self.route_name {
            None => true,
            Some(name) => {
                route.route_id.contains(name.as_str())
                    || route.route_long_name.contains(name.as_str())
            }
        }
    }

    pub fn matches_stop(&self, stop: &StopRef) -> bool {
        match &self.stop_name {
            None => true,
            Some(name) => stop.stop_name.contains(name.as_str()),
        }
    }

    /// A directional query never matches a trip without a direction.
    pub fn matches_direction(&self, direction: Option<Direction>) -> bool {
        match self.direction {
            None => true,
            Some(wanted) => direction == Some(wanted),
        }
    }
}

/// The concrete stops and routes a `Query` refers to.
///
/// Built once per registration and replaced wholesale, never edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub query: Query,
    pub stops: BTreeSet<StopRef>,
    pub routes: BTreeSet<RouteRef>,
    pub direction: Option<Direction>,
}

impl ResolvedQuery {
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty() || self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_matches_id_or_long_name() {
        let route = RouteRef::new("49", "Cross Town Express");
        assert!(Query::new(Some("49"), None).matches_route(&route));
        assert!(Query::new(Some("Town"), None).matches_route(&route));
        assert!(Query::new(None, None).matches_route(&route));
        assert!(!Query::new(Some("48"), None).matches_route(&route));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let route = RouteRef::new("WTR", "West Trenton");
        assert!(!Query::new(Some("west"), None).matches_route(&route));

        let stop = StopRef::new("S1", "Main St & 3rd");
        assert!(Query::new(None, Some("Main St")).matches_stop(&stop));
        assert!(!Query::new(None, Some("main st")).matches_stop(&stop));
    }

    #[test]
    fn direction_filter() {
        let any = Query::default();
        assert!(any.matches_direction(None));
        assert!(any.matches_direction(Some(Direction::Inbound)));

        let inbound = Query::default().with_direction(Direction::Inbound);
        assert!(inbound.matches_direction(Some(Direction::Inbound)));
        assert!(!inbound.matches_direction(Some(Direction::Outbound)));
        assert!(!inbound.matches_direction(None));
    }

    #[test]
    fn deserialize_partial_query() {
        let q: Query = serde_json::from_str(r#"{"stop_name":"Norristown","direction":1}"#).unwrap();
        assert_eq!(q.route_name, None);
        assert_eq!(q.stop_name.as_deref(), Some("Norristown"));
        assert_eq!(q.direction, Some(Direction::Inbound));
    }
}
