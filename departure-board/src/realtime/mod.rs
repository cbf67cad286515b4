//! Realtime delay feeds.
//!
//! A feed is fetched periodically, decoded into a `FeedSnapshot`, and swapped
//! into the `FeedCache` whole. `RealtimeMatcher` then answers "how late is
//! trip X at stop sequence N" against whichever snapshot is current.

mod cache;
mod client;
mod convert;
mod error;
mod feed;
mod matcher;
mod types;

pub use cache::FeedCache;
pub use client::{FeedClient, FeedClientConfig, FeedSource};
pub use convert::{snapshot_from_messages, snapshot_from_trip_delays};
pub use error::FeedError;
pub use feed::{FeedSnapshot, StopEvent, StopUpdate, TripUpdate};
pub use matcher::RealtimeMatcher;
pub use types::{
    FeedEntity, FeedMessage, StopTimeEventDto, StopTimeUpdateDto, TripDelayDto, TripDescriptor,
    TripUpdateDto,
};
