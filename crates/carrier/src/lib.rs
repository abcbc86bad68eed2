//! `tk-carrier`: carrier tracking lookup for takuhai.
//!
//! The lookup is a black box returning `(result code, status text)` for a
//! `(carrier, number)` pair.  [`CarrierLookup`] is the seam; the shipped
//! implementations are:
//!
//! | `carrier.mode` | Implementation          | Use                         |
//! |----------------|-------------------------|-----------------------------|
//! | `rest`         | [`RestCarrierClient`]   | production lookup service   |
//! | `static`       | [`StaticCarrierLookup`] | local runs, demos, tests    |
//!
//! Lookups never return an error.  A transport fault is reported as a
//! failed lookup with an empty status, which the conversation layer
//! treats like a number the carrier has not indexed yet.

pub mod fixed;
pub mod provider;
pub mod rest;
pub mod types;

pub use fixed::StaticCarrierLookup;
pub use provider::CarrierLookup;
pub use rest::RestCarrierClient;
pub use types::{LookupResult, ResultCode};

use std::sync::Arc;

use tk_domain::config::{CarrierConfig, CarrierMode};
use tk_domain::error::Result;

/// Build the [`CarrierLookup`] selected by `carrier.mode`.
pub fn create_lookup(cfg: &CarrierConfig) -> Result<Arc<dyn CarrierLookup>> {
    match cfg.mode {
        CarrierMode::Rest => {
            let client = RestCarrierClient::new(cfg)?;
            tracing::info!(url = %cfg.base_url, "using REST carrier lookup");
            Ok(Arc::new(client))
        }
        CarrierMode::Static => {
            let lookup = StaticCarrierLookup::from_config(cfg);
            tracing::info!(
                results = cfg.static_results.len(),
                "using static carrier lookup"
            );
            Ok(Arc::new(lookup))
        }
    }
}
