mod client;
mod basic;
pub mod auth;
#[cfg(test)]
pub(crate) mod stub;

pub use client::HttpClient;
pub use basic::{BasicClient, CONNECT_TIMEOUT, DEFAULT_TIMEOUT};

use anyhow::{Context, Result};

/// Builds a bare GET request for `url`.
pub fn get_request(url: &str) -> Result<reqwest::Request> {
    let url = url
        .parse()
        .with_context(|| format!("invalid URL '{url}'"))?;
    Ok(reqwest::Request::new(reqwest::Method::GET, url))
}

/// GETs `url` and returns the body. Non-success statuses are errors.
pub async fn fetch_bytes<C: HttpClient>(
    client: &C,
    url: &str,
) -> Result<Vec<u8>> {
    let req = get_request(url)?;

    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("request to {url} failed"))?
        .error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::stub::StubClient;
    use super::*;

    #[tokio::test]
    async fn test_fetch_bytes_returns_body() {
        let client = StubClient::ok(b"payload".to_vec());
        let bytes = fetch_bytes(&client, "https://feeds.example/gtfs").await.unwrap();
        assert_eq!(bytes, b"payload");
        assert_eq!(client.last_url().as_deref(), Some("https://feeds.example/gtfs"));
    }

    #[tokio::test]
    async fn test_fetch_bytes_rejects_error_status() {
        let client = StubClient::status(503);
        assert!(fetch_bytes(&client, "https://feeds.example/gtfs").await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_bytes_rejects_bad_url() {
        let client = StubClient::ok(Vec::new());
        assert!(fetch_bytes(&client, "not a url").await.is_err());
        assert!(client.last_url().is_none());
    }
}
