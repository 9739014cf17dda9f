// src/ingest/client.rs
//! Resilient HTTP client shared by the live adapters.
//!
//! Each adapter owns one `ResilientClient`. The client enforces a minimum
//! spacing between requests (per instance, not global) and retries transport
//! failures and HTTP error statuses with exponential backoff plus jitter.
//! The wire itself sits behind [`Transport`] so tests can script responses.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::ingest::error::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.push((key.to_string(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }
}

/// A successful (2xx) response body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn json<T: DeserializeOwned>(&self, context: &str) -> Result<T, IngestError> {
        serde_json::from_str(&self.body).map_err(|source| IngestError::Decode {
            context: context.to_string(),
            source,
        })
    }
}

/// One HTTP exchange. Implementations return `Err(Status)` for non-2xx.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, IngestError>;
}

/// Production transport over `reqwest`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("product-ranker/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, IngestError> {
        let method = req.method.as_str();
        let mut builder = match req.method {
            Method::Get => self.client.get(&req.url),
            Method::Post => self.client.post(&req.url),
        };
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        for (k, v) in &req.headers {
            builder = builder.header(k.as_str(), v.as_str());
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let transport_err = |e: reqwest::Error| IngestError::Transport {
            method,
            url: req.url.clone(),
            message: e.to_string(),
        };

        let rsp = builder.send().await.map_err(transport_err)?;
        let status = rsp.status();
        if !status.is_success() {
            return Err(IngestError::Status {
                method,
                url: req.url.clone(),
                status: status.as_u16(),
            });
        }
        let body = rsp.text().await.map_err(transport_err)?;
        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Attempts, base delay and jitter ceiling for retries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_jitter: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (0-based): `base * 2^attempt + jitter`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(1u32 << attempt.min(16));
        let jitter_max = self.max_jitter.as_secs_f64();
        if jitter_max <= 0.0 {
            return exp;
        }
        let jitter = rand::rng().random_range(0.0..jitter_max);
        exp + Duration::from_secs_f64(jitter)
    }
}

pub struct ResilientClient {
    adapter: &'static str,
    transport: Arc<dyn Transport>,
    min_interval: Duration,
    policy: RetryPolicy,
    last_request: Mutex<Option<Instant>>,
}

impl ResilientClient {
    pub fn new(adapter: &'static str, transport: Arc<dyn Transport>, min_interval: Duration) -> Self {
        Self {
            adapter,
            transport,
            min_interval,
            policy: RetryPolicy::default(),
            last_request: Mutex::new(None),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Sleep until `min_interval` has passed since this client's previous request.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Send with throttling and retries. The final failure is returned as-is;
    /// no sleep follows the last attempt.
    pub async fn send(&self, req: &HttpRequest) -> Result<HttpResponse, IngestError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt: u32 = 0;
        loop {
            self.throttle().await;
            debug!(adapter = self.adapter, method = req.method.as_str(), url = %req.url, attempt, "http request");

            match self.transport.execute(req).await {
                Ok(rsp) => return Ok(rsp),
                Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        adapter = self.adapter,
                        error = %e,
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "request failed, retrying"
                    );
                    counter!("http_retries_total", "adapter" => self.adapter).increment(1);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, req: &HttpRequest) -> Result<T, IngestError> {
        let rsp = self.send(req).await?;
        rsp.json(&req.url)
    }
}
