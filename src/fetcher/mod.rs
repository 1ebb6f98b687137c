pub mod document;
pub mod http_fetcher;

use async_trait::async_trait;
use thiserror::Error;

pub use document::{parse_document, Channel, RssDocument, RssItem};
pub use http_fetcher::HttpFetcher;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP {status} fetching {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Feed parsing error: {0}")]
    Parse(String),
}

/// Retrieves one feed document. Implementations hold no per-feed state.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<RssDocument, FetchError>;
}
