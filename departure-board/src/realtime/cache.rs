//! Realtime feed cache.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::client::FeedClient;
use super::error::FeedError;
use super::feed::FeedSnapshot;

/// Thread-safe holder of the latest realtime snapshot.
///
/// Readers take an `Arc` to the current snapshot and keep using it even if
/// a refresh swaps in a new one meanwhile.
#[derive(Clone)]
pub struct FeedCache {
    inner: Arc<RwLock<Arc<FeedSnapshot>>>,
    client: Option<FeedClient>,
}

impl FeedCache {
    /// A cache refreshed from `client`. Starts empty until the first refresh.
    pub fn new(client: FeedClient) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(FeedSnapshot::empty()))),
            client: Some(client),
        }
    }

    /// A cache with no feed behind it. Always empty unless replaced by hand.
    pub fn disabled() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(FeedSnapshot::empty()))),
            client: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// The current snapshot.
    pub async fn snapshot(&self) -> Arc<FeedSnapshot> {
        let guard = self.inner.read().await;
        Arc::clone(&*guard)
    }

    /// Swap in a fully built snapshot.
    pub async fn replace(&self, snapshot: FeedSnapshot) {
        let mut guard = self.inner.write().await;
        *guard = Arc::new(snapshot);
    }

    /// Fetch a new snapshot and swap it in.
    ///
    /// On failure the current snapshot stays in effect and the error is
    /// returned. Returns the number of trips in the new snapshot.
    pub async fn refresh(&self) -> Result<usize, FeedError> {
        let Some(client) = &self.client else {
            return Ok(0);
        };

        let snapshot = client.fetch().await?;
        let count = snapshot.len();
        self.replace(snapshot).await;

        Ok(count)
    }
}
