// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Byte retrieval used for search pages, listing pages and images.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a URL and decode the body as text.
    async fn fetch_text(&self, url: &str) -> Result<String>;

    /// Fetch a URL and return the raw body.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &CrawlerConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// [`Fetcher`] backed by a `reqwest` client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a fetcher from crawler settings.
    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self::new(create_client(config)?))
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(url, format!("HTTP {status}")));
        }
        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        response.text().await.map_err(|e| AppError::fetch(url, e))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(url).await?;
        let bytes = response.bytes().await.map_err(|e| AppError::fetch(url, e))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_from_defaults() {
        assert!(create_client(&CrawlerConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let config = CrawlerConfig {
            timeout_secs: 2,
            ..CrawlerConfig::default()
        };
        let fetcher = HttpFetcher::from_config(&config).unwrap();

        let err = fetcher
            .fetch_text("http://127.0.0.1:9/search")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Fetch { .. }));
    }
}
