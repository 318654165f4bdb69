//! Artwork retrieval
//!
//! The extractor only needs raw image bytes, so fetching sits behind a trait:
//! HTTP in production, in-memory fakes in tests.

use crate::error::{Result, ThemeError};
use async_trait::async_trait;
use std::time::Duration;

/// Source of encoded artwork bytes
#[async_trait]
pub trait ArtworkFetcher: Send + Sync {
    /// Download the artwork at `url`
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Fetches artwork over HTTP(S)
pub struct HttpArtworkFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpArtworkFetcher {
    /// Create a fetcher with a request timeout and a size limit
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("podcue/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, max_bytes })
    }
}

#[async_trait]
impl ArtworkFetcher for HttpArtworkFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ThemeError::Status(status.as_u16()));
        }

        if let Some(length) = response.content_length() {
            let length = usize::try_from(length).unwrap_or(usize::MAX);
            if length > self.max_bytes {
                return Err(ThemeError::TooLarge(length, self.max_bytes));
            }
        }

        let bytes = response.bytes().await?;
        if bytes.len() > self.max_bytes {
            return Err(ThemeError::TooLarge(bytes.len(), self.max_bytes));
        }

        tracing::debug!("Fetched {} bytes of artwork from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}
