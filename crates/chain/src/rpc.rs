use std::time::Duration;

use serde_json::Value as Json;

use crate::error::ChainError;

/// A JSON-RPC client that tries every configured endpoint before
/// backing off and retrying, mirroring `original_source`'s
/// `RpcClient.post` (tried-every-url-per-attempt, exponential-ish
/// backoff between attempts).
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    urls: Vec<String>,
    max_retries: u32,
    backoff: Duration,
}

impl RpcClient {
    /// Builds a client over `urls` (tried in order on every attempt).
    pub fn new(urls: Vec<String>) -> Self {
        Self::with_config(urls, Duration::from_secs(10), 3, Duration::from_millis(500))
    }

    /// Builds a client with explicit timeout/retry/backoff tuning.
    pub fn with_config(
        urls: Vec<String>,
        timeout: Duration,
        max_retries: u32,
        backoff: Duration,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client builds with a static config");
        Self { http, urls, max_retries, backoff }
    }

    /// POSTs `payload` as JSON to each configured URL in turn, retrying
    /// the whole endpoint list up to `max_retries` times with a linear
    /// backoff, per `original_source`.
    pub async fn post(&self, payload: &Json) -> Result<Json, ChainError> {
        for attempt in 0..self.max_retries {
            for url in &self.urls {
                match self.http.post(url).json(payload).send().await {
                    Ok(response) => match response.error_for_status() {
                        Ok(response) => match response.json::<Json>().await {
                            Ok(body) => return Ok(body),
                            Err(err) => {
                                tracing::warn!(%url, %err, "rpc response decode failed");
                            }
                        },
                        Err(err) => {
                            tracing::warn!(%url, %err, "rpc returned error status");
                        }
                    },
                    Err(err) => {
                        tracing::warn!(%url, %err, "rpc request failed");
                    }
                }
            }
            tokio::time::sleep(self.backoff * (attempt + 1)).await;
        }
        Err(ChainError::RpcExhausted { url_count: self.urls.len(), attempts: self.max_retries })
    }
}
