//! HTTP fetcher abstraction
//!
//! The resolver only ever needs `GET url -> (status, body)`. Hiding that
//! behind a trait keeps resolution testable without sockets and keeps the
//! HTTP client choice out of the core logic.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Error from the transport layer (connection refused, timeout, ...)
#[derive(Debug, Error)]
#[error("fetch failed: {0}")]
pub struct FetchError(pub String);

/// A fetched HTTP response
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

/// Blocking-free GET of a URL. Implementations must be safe for concurrent
/// use; the fetcher's timeout is the resolver's only cancellation knob.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// Production fetcher backed by a shared `reqwest` client
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client construction is infallible with static config");
        Self { client }
    }
}

impl Default for ReqwestFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError(e.to_string()))?;

        Ok(FetchResponse { status, body })
    }
}

/// Canned-response fetcher for tests and offline demos.
///
/// Unknown URLs answer 404 with an empty body, like a server that has no
/// such route.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: RwLock<HashMap<String, String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the body served for a URL
    pub fn insert(&self, url: impl Into<String>, body: impl Into<String>) {
        let mut responses = self.responses.write().unwrap();
        responses.insert(url.into(), body.into());
    }

    /// Drop a URL so subsequent fetches see a 404
    pub fn remove(&self, url: &str) {
        let mut responses = self.responses.write().unwrap();
        responses.remove(url);
    }
}

#[async_trait]
impl HttpFetcher for StaticFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let responses = self.responses.read().unwrap();
        match responses.get(url) {
            Some(body) => Ok(FetchResponse {
                status: 200,
                body: body.clone(),
            }),
            None => Ok(FetchResponse {
                status: 404,
                body: String::new(),
            }),
        }
    }
}
