//! Transit departure board server.
//!
//! Watches a handful of route and stop queries against a static GTFS-style
//! schedule, merges in realtime delays, and publishes an ordered,
//! deduplicated board of upcoming departures.

pub mod board;
pub mod config;
pub mod domain;
pub mod engine;
pub mod expand;
pub mod realtime;
pub mod resolve;
pub mod store;
pub mod web;
