//! The broadcast engine.
//!
//! Owns the schedule store behind a single async gate, the list of resolved
//! watches, and the realtime feed cache. Each broadcast walks every watch,
//! expands its trips into departures, applies realtime delays, and publishes
//! the finished board to subscribers.
//!
//! Only one cycle touches the store at a time. A caller arriving while
//! another cycle runs waits for it rather than being dropped.

use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};
use moka::future::Cache as MokaCache;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::board::{Aggregator, Board};
use crate::config::BoardConfig;
use crate::domain::{DepartureEvent, Query, ResolvedQuery};
use crate::expand::{ExpandError, expand};
use crate::realtime::{FeedCache, FeedError, FeedSnapshot, RealtimeMatcher};
use crate::resolve::resolve_query;
use crate::store::{ScheduleStore, StoreError, TripFilter};

/// Maximum number of distinct queries remembered by the resolution memo.
const MEMO_CAPACITY: u64 = 1024;

/// Errors that abort a registration or broadcast.
///
/// Per-record problems never surface here; they are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("schedule store failed: {0}")]
    Store(#[from] StoreError),
}

/// State only reachable through the gate.
struct Gated<S> {
    store: S,
    watches: Vec<Arc<ResolvedQuery>>,
}

/// Departure board engine over a schedule store `S`.
pub struct Engine<S: ScheduleStore> {
    gate: Mutex<Gated<S>>,
    resolved: MokaCache<Query, Arc<ResolvedQuery>>,
    feed: FeedCache,
    matcher: RealtimeMatcher,
    config: BoardConfig,
    latest: watch::Sender<Option<Arc<Board>>>,
}

impl<S: ScheduleStore> Engine<S> {
    /// Create an engine over an already imported store.
    pub fn new(store: S, feed: FeedCache, config: BoardConfig) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            gate: Mutex::new(Gated {
                store,
                watches: Vec::new(),
            }),
            resolved: MokaCache::builder().max_capacity(MEMO_CAPACITY).build(),
            feed,
            matcher: RealtimeMatcher::new(config.max_delay()),
            config,
            latest,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn feed(&self) -> &FeedCache {
        &self.feed
    }

    /// Resolve and add watches. Returns the total number of watches.
    ///
    /// Resolving a query that matches nothing still adds it.
    pub async fn register(&self, queries: Vec<Query>) -> Result<usize, EngineError> {
        let mut gated = self.gate.lock().await;

        for query in queries {
            let resolved = self.resolve_memoized(&gated.store, query).await?;
            if resolved.is_empty() {
                info!(query = ?resolved.query, "watch matches no stops");
            }
            gated.watches.push(resolved);
        }

        info!(watches = gated.watches.len(), "registered watches");
        Ok(gated.watches.len())
    }

    async fn resolve_memoized(&self, store: &S, query: Query) -> Result<Arc<ResolvedQuery>, StoreError> {
        if let Some(resolved) = self.resolved.get(&query).await {
            return Ok(resolved);
        }

        let resolved = Arc::new(resolve_query(store, &query).await?);
        self.resolved.insert(query, Arc::clone(&resolved)).await;
        Ok(resolved)
    }

    /// The watches currently registered, in registration order.
    pub async fn watches(&self) -> Vec<Arc<ResolvedQuery>> {
        self.gate.lock().await.watches.clone()
    }

    /// Run one broadcast cycle at local time `now` and publish the result.
    pub async fn broadcast(&self, now: NaiveDateTime) -> Result<Arc<Board>, EngineError> {
        let gated = self.gate.lock().await;
        self.cycle(&gated, now).await
    }

    /// Run a broadcast at the local time the gate is acquired.
    pub async fn broadcast_now(&self) -> Result<Arc<Board>, EngineError> {
        let gated = self.gate.lock().await;
        self.cycle(&gated, Local::now().naive_local()).await
    }

    /// Build and publish a board. The caller holds the gate until this
    /// returns, so boards are published in the order cycles ran.
    async fn cycle(&self, gated: &Gated<S>, now: NaiveDateTime) -> Result<Arc<Board>, EngineError> {
        let snapshot = self.feed.snapshot().await;

        let mut aggregator = Aggregator::new();
        for watch in &gated.watches {
            self.collect(&gated.store, watch, &snapshot, now.date(), &mut aggregator)
                .await?;
        }
        let collected = aggregator.len();

        let departures = aggregator.finish(now, self.config.grace(), &self.config.sort_options());
        let board = Arc::new(Board {
            generated_at: now,
            departures,
        });

        info!(
            collected,
            shown = board.departures.len(),
            live_trips = snapshot.len(),
            "broadcast board"
        );
        self.latest.send_replace(Some(Arc::clone(&board)));
        Ok(board)
    }

    /// Add every upcoming departure for one watch to `aggregator`.
    async fn collect(
        &self,
        store: &S,
        watch: &ResolvedQuery,
        snapshot: &FeedSnapshot,
        today: NaiveDate,
        aggregator: &mut Aggregator,
    ) -> Result<(), EngineError> {
        for route in &watch.routes {
            let trips = store.get_trips(&TripFilter::by_route(&route.route_id)).await?;

            for trip in trips.iter().filter(|t| watch.query.matches_direction(t.direction)) {
                for stop in &watch.stops {
                    let expansion =
                        match expand(store, trip, stop, today, self.config.lookahead_days).await {
                            Ok(Some(expansion)) => expansion,
                            Ok(None) => continue,
                            Err(ExpandError::Store(e)) => return Err(e.into()),
                            Err(ExpandError::Record(e)) => {
                                debug!(error = %e, "skipping malformed stop time");
                                continue;
                            }
                        };

                    for scheduled in expansion.instants {
                        let delay = self
                            .matcher
                            .match_delay(
                                snapshot,
                                &trip.trip_id,
                                expansion.stop_sequence,
                                local_epoch(scheduled),
                            )
                            .map(|update| update.delay);

                        match DepartureEvent::build(
                            stop,
                            route,
                            trip,
                            expansion.stop_sequence,
                            scheduled,
                            delay,
                        ) {
                            Ok(event) => {
                                aggregator.insert(event);
                            }
                            Err(e) => debug!(error = %e, "skipping malformed trip"),
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Fetch the realtime feed. The previous snapshot stays on failure.
    pub async fn refresh_realtime(&self) -> Result<usize, FeedError> {
        match self.feed.refresh().await {
            Ok(count) => {
                debug!(trips = count, "realtime feed refreshed");
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "realtime refresh failed, keeping previous snapshot");
                Err(e)
            }
        }
    }

    /// Reload the store and re-resolve every watch against it.
    ///
    /// The watch list is replaced as a whole once every query has resolved.
    /// If the reload fails the old store data and watches stay.
    pub async fn refresh_schedule(&self) -> Result<usize, EngineError> {
        let mut gated = self.gate.lock().await;
        gated.store.refresh().await?;
        self.resolved.invalidate_all();

        let mut watches = Vec::with_capacity(gated.watches.len());
        for watch in &gated.watches {
            watches.push(self.resolve_memoized(&gated.store, watch.query.clone()).await?);
        }
        gated.watches = watches;

        info!(watches = gated.watches.len(), "schedule refreshed");
        Ok(gated.watches.len())
    }

    /// The most recently published board, if any cycle has completed.
    pub fn latest(&self) -> Option<Arc<Board>> {
        self.latest.borrow().clone()
    }

    /// Receive every board as it is published.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Board>>> {
        self.latest.subscribe()
    }
}

/// POSIX seconds for a local wall-clock instant.
///
/// In a DST gap there is no such instant and no timestamp-derived delay can
/// be computed.
fn local_epoch(instant: NaiveDateTime) -> Option<i64> {
    Local
        .from_local_datetime(&instant)
        .earliest()
        .map(|dt| dt.timestamp())
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
