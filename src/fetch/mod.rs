//! Remote retrieval of catalog and site tables.
//!
//! The core pipeline never touches the network. Remote sources are fetched
//! here and handed over as [`DataSource::Inline`] buffers.

mod basic;

pub use basic::BasicClient;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::source::DataSource;

/// Executes HTTP requests for remote table sources.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response>;
}

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    let bytes = resp.bytes().await?.to_vec();
    debug!(url, bytes = bytes.len(), "Fetched remote table");
    Ok(bytes)
}

/// Resolves a CLI location into a [`DataSource`]: http(s) URLs are downloaded
/// now, anything else is treated as a local path and read by the pipeline.
#[tracing::instrument(skip(client))]
pub async fn resolve<C: HttpClient>(client: &C, location: &str) -> Result<DataSource> {
    if is_remote(location) {
        let bytes = fetch_bytes(client, location)
            .await
            .with_context(|| format!("failed to fetch {location}"))?;
        Ok(DataSource::inline(location, bytes))
    } else {
        Ok(DataSource::file(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fails the test if anything reaches the network.
    struct OfflineClient;

    #[async_trait]
    impl HttpClient for OfflineClient {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            panic!("unexpected request to {}", req.url());
        }
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.org/drones.csv"));
        assert!(is_remote("http://localhost/ports.csv"));
        assert!(!is_remote("data/droneType.csv"));
        assert!(!is_remote("httpdata.csv"));
    }

    #[tokio::test]
    async fn test_local_path_is_not_fetched() {
        let source = resolve(&OfflineClient, "data/droneType.csv").await.unwrap();
        assert_eq!(source, DataSource::file("data/droneType.csv"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_an_error() {
        assert!(fetch_bytes(&OfflineClient, "http://").await.is_err());
    }
}
