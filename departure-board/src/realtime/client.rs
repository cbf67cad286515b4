//! HTTP client for realtime feeds.

use chrono::Utc;
use futures::future::join_all;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::convert::{snapshot_from_messages, snapshot_from_trip_delays};
use super::error::FeedError;
use super::feed::FeedSnapshot;
use super::types::{FeedMessage, TripDelayDto};

/// Which realtime feed, if any, adjusts scheduled departures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedSource {
    /// Schedule only; no departure carries a delay.
    #[default]
    None,
    /// A JSON list of per-trip delays in minutes.
    TripDelays { url: String },
    /// One or more GTFS-Realtime TripUpdate feeds in JSON encoding.
    GtfsRt { urls: Vec<String> },
}

impl FeedSource {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, FeedSource::None)
    }
}

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    pub source: FeedSource,
    /// Sent as the `x-apikey` header when set
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FeedClientConfig {
    pub fn new(source: FeedSource) -> Self {
        Self {
            source,
            api_key: None,
            timeout_secs: 30,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Fetches and decodes a realtime feed into a snapshot.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    source: FeedSource,
}

impl FeedClient {
    pub fn new(config: FeedClientConfig) -> Result<Self, FeedError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| FeedError::Config("invalid API key format".to_string()))?;
            headers.insert(HeaderName::from_static("x-apikey"), value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            source: config.source,
        })
    }

    /// Fetch a complete snapshot.
    ///
    /// With several URLs all are fetched concurrently; if any one fails the
    /// whole fetch fails, so a snapshot is never partial.
    pub async fn fetch(&self) -> Result<FeedSnapshot, FeedError> {
        match &self.source {
            FeedSource::None => Ok(FeedSnapshot::empty()),
            FeedSource::TripDelays { url } => {
                let rows: Vec<TripDelayDto> = self.get_json(url).await?;
                Ok(snapshot_from_trip_delays(rows, Utc::now()))
            }
            FeedSource::GtfsRt { urls } => {
                let results = join_all(urls.iter().map(|url| self.get_json::<FeedMessage>(url))).await;
                let messages = results.into_iter().collect::<Result<Vec<_>, _>>()?;
                Ok(snapshot_from_messages(messages, Utc::now()))
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FeedError> {
        debug!(url, "fetching realtime feed");
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(FeedError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                url: url.to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FeedError::Json {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
