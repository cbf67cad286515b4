//! Realtime feed error types.

/// Errors that can occur while refreshing a realtime feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed
    #[error("unauthorized: check FEED_API_KEY")]
    Unauthorized,

    /// Feed returned an error status
    #[error("feed error {status} from {url}: {message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    /// Failed to parse the feed body
    #[error("JSON parse error from {url}: {message}")]
    Json { url: String, message: String },

    /// Client construction failed
    #[error("invalid feed configuration: {0}")]
    Config(String),
}
