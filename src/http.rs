//! Outbound HTTP for tools
//!
//! One `reqwest::Client` with a browser-like user agent and a fixed per-request
//! timeout. Requests are never retried here; a failed call is reported back to
//! the agent, which decides what to do next.

use crate::config::HttpConfig;
use crate::error::HttpError;
use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Shared GET client used by every tool
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher from the HTTP settings
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.clone())
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// GET a URL and return the raw body. Non-2xx is an error.
    #[instrument(skip(self))]
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;

        debug!(
            "Fetched {} bytes in {:.3}s",
            body.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(body.to_vec())
    }

    async fn send<Q: Serialize + ?Sized>(
        &self,
        url: &str,
        query: &Q,
    ) -> Result<Response, HttpError> {
        Ok(self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?)
    }

    /// GET with query parameters and return the body as text
    pub async fn get_text<Q: Serialize + ?Sized>(
        &self,
        url: &str,
        query: &Q,
    ) -> Result<String, HttpError> {
        Ok(self.send(url, query).await?.text().await?)
    }

    /// GET with query parameters and decode the JSON body
    #[instrument(skip(self, query))]
    pub async fn get_json<T, Q>(&self, url: &str, query: &Q) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let start = Instant::now();
        let response = self.send(url, query).await?;
        let elapsed = start.elapsed();

        if elapsed.as_secs() > 5 {
            warn!("Slow API response detected: {:.3}s", elapsed.as_secs_f64());
        }

        response.json().await.map_err(|e| {
            if e.is_decode() {
                HttpError::Decode(e)
            } else {
                HttpError::Request(e)
            }
        })
    }
}
