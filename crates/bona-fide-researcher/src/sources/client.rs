//! Shared HTTP client for verification sources.
//!
//! Provides:
//! - Connection pooling via reqwest
//! - Retry middleware with exponential backoff
//! - A polite fixed delay between requests to public APIs
//! - Response caching with a short TTL

use std::time::Duration;

use moka::future::Cache;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{Config, api};
use crate::error::{SourceError, SourceResult};

/// HTTP client shared by all verification sources.
#[derive(Clone)]
pub struct SourceClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Response cache.
    cache: Cache<String, serde_json::Value>,

    /// Polite delay between requests.
    polite_delay: Duration,
}

impl SourceClient {
    /// Create a new client from the service configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            "application/json".parse().expect("valid accept header"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
            .build_with_max_retries(3);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let cache = Cache::builder()
            .max_capacity(config.cache_max_size)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self { client, cache, polite_delay: config.polite_delay })
    }

    /// Make a GET request and parse the body as JSON.
    pub async fn get_json(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> SourceResult<serde_json::Value> {
        // Check cache
        let cache_key = Self::cache_key(url, params);
        if let Some(cached) = self.cache.get(&cache_key).await {
            return Ok(cached);
        }

        // Polite rate limit
        tokio::time::sleep(self.polite_delay).await;

        let response = self.client.get(url).query(params).send().await?;
        let response = Self::handle_response(response).await?;
        let value: serde_json::Value = response.json().await?;

        self.cache.insert(cache_key, value.clone()).await;

        Ok(value)
    }

    /// Map API response status codes onto [`SourceError`].
    async fn handle_response(response: reqwest::Response) -> SourceResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                Err(SourceError::rate_limited(retry_after))
            }
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(SourceError::not_found(text))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(SourceError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(SourceError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(SourceError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }

    /// Generate cache key.
    fn cache_key(url: &str, params: &[(String, String)]) -> String {
        use md5::{Digest, Md5};

        let mut hasher = Md5::new();
        hasher.update(url.as_bytes());
        hasher.update(b"|");

        for (k, v) in params {
            hasher.update(k.as_bytes());
            hasher.update(b"=");
            hasher.update(v.as_bytes());
            hasher.update(b"&");
        }

        format!("{:x}", hasher.finalize())
    }
}

impl std::fmt::Debug for SourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceClient").field("polite_delay", &self.polite_delay).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_depends_on_params() {
        let a = SourceClient::cache_key("https://x", &[("q".into(), "jane".into())]);
        let b = SourceClient::cache_key("https://x", &[("q".into(), "john".into())]);
        let c = SourceClient::cache_key("https://x", &[("q".into(), "jane".into())]);
        assert_ne!(a, b);
        assert_eq!(a, c);
    }
}
