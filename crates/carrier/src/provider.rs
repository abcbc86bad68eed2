//! The `CarrierLookup` trait: one tracking lookup per call.

use async_trait::async_trait;

use crate::types::LookupResult;

/// Abstraction over the carrier tracking service.
///
/// Implementations make a single attempt and never fail: network or
/// decoding problems come back as [`LookupResult::transport_fault`].
#[async_trait]
pub trait CarrierLookup: Send + Sync {
    async fn lookup(&self, carrier: &str, number: &str) -> LookupResult;
}
