//! REST implementation of [`CarrierLookup`].
//!
//! `RestCarrierClient` wraps a `reqwest::Client` and asks the tracking
//! lookup service `GET /v1/track?company=..&number=..`.  One attempt per
//! call; no retry.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tk_domain::config::CarrierConfig;
use tk_domain::error::{Error, Result};
use tk_domain::trace::TraceEvent;
use uuid::Uuid;

use crate::provider::CarrierLookup;
use crate::types::{LookupResult, TrackResponse};

/// Created once and reused for the lifetime of the process.  The
/// underlying `reqwest::Client` keeps a connection pool.
#[derive(Debug, Clone)]
pub struct RestCarrierClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl RestCarrierClient {
    pub fn new(cfg: &CarrierConfig) -> Result<Self> {
        let timeout = Duration::from_millis(cfg.timeout_ms);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key: cfg.api_key.clone(),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        let rb = rb
            .header("X-Client-Type", "takuhai")
            .header("X-Trace-Id", Uuid::new_v4().to_string());
        match self.api_key {
            Some(ref key) => rb.header("X-Api-Key", key),
            None => rb,
        }
    }

    async fn fetch(&self, carrier: &str, number: &str) -> Result<LookupResult> {
        let url = format!("{}/v1/track", self.base_url);
        let resp = self
            .decorate(self.http.get(&url))
            .query(&[("company", carrier), ("number", number)])
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let body = resp.text().await.map_err(from_reqwest)?;
        if !status.is_success() {
            return Err(Error::Carrier {
                carrier: carrier.to_owned(),
                message: format!("lookup returned {status}: {body}"),
            });
        }

        let parsed: TrackResponse = serde_json::from_str(&body).map_err(|e| Error::Carrier {
            carrier: carrier.to_owned(),
            message: format!("failed to parse lookup response: {e}: {body}"),
        })?;
        Ok(parsed.into())
    }
}

#[async_trait]
impl CarrierLookup for RestCarrierClient {
    async fn lookup(&self, carrier: &str, number: &str) -> LookupResult {
        let start = Instant::now();
        let result = match self.fetch(carrier, number).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(
                    carrier = %carrier,
                    number = %number,
                    error = %e,
                    "carrier lookup failed"
                );
                LookupResult::transport_fault()
            }
        };

        TraceEvent::CarrierLookup {
            carrier: carrier.to_owned(),
            number: number.to_owned(),
            success: result.is_success(),
            status: result.status.clone(),
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();

        result
    }
}

/// Map a `reqwest::Error` into the shared error type.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}
