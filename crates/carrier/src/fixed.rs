//! Table-driven [`CarrierLookup`] that never touches the network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tk_domain::config::CarrierConfig;
use tk_domain::tracking::encode_key;

use crate::provider::CarrierLookup;
use crate::types::{LookupResult, STATUS_NOT_REGISTERED};

/// Answers from a fixed table keyed by composite key.  Numbers missing
/// from the table read as not registered with the carrier.
#[derive(Default)]
pub struct StaticCarrierLookup {
    results: RwLock<HashMap<String, LookupResult>>,
    calls: AtomicUsize,
}

impl StaticCarrierLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &CarrierConfig) -> Self {
        let results = cfg
            .static_results
            .iter()
            .map(|(key, r)| {
                let result = if r.success {
                    LookupResult::success(r.status.clone())
                } else {
                    LookupResult::failure(r.status.clone())
                };
                (key.clone(), result)
            })
            .collect();
        Self {
            results: RwLock::new(results),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(self, carrier: &str, number: &str, result: LookupResult) -> Self {
        self.set(carrier, number, result);
        self
    }

    /// Replace the answer for one number.
    pub fn set(&self, carrier: &str, number: &str, result: LookupResult) {
        self.results.write().insert(encode_key(carrier, number), result);
    }

    /// Number of lookups served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CarrierLookup for StaticCarrierLookup {
    async fn lookup(&self, carrier: &str, number: &str) -> LookupResult {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.results
            .read()
            .get(&encode_key(carrier, number))
            .cloned()
            .unwrap_or_else(|| LookupResult::failure(STATUS_NOT_REGISTERED))
    }
}
