//! Tracking persistence for takuhai.
//!
//! Two layers:
//! - [`ItemBackend`]: a generic partition/sort-key item store (point get,
//!   full-overwrite put, key-condition query with an optional attribute
//!   filter, point delete).  [`MemoryBackend`] and [`FileBackend`] are the
//!   shipped implementations.
//! - [`TrackingStore`]: the tracking-record view on top of a backend.
//!   Reads never fail; they report [`ReadOutcome::Degraded`] and fall back
//!   to an empty value.  Writes surface errors to the caller.

pub mod backend;
pub mod file;
pub mod memory;
pub mod outcome;
pub mod tracking;

pub use backend::{Item, ItemBackend, ItemQuery, SortKeyCondition};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use outcome::ReadOutcome;
pub use tracking::TrackingStore;

use std::sync::Arc;

use tk_domain::config::{StoreBackendKind, StoreConfig};
use tk_domain::error::Result;

/// Open the backend selected by `store.backend`.
pub fn open_backend(cfg: &StoreConfig) -> Result<Arc<dyn ItemBackend>> {
    match cfg.backend {
        StoreBackendKind::Memory => {
            tracing::info!(table = %cfg.table_name, "using in-memory tracking table");
            Ok(Arc::new(MemoryBackend::new()))
        }
        StoreBackendKind::File => {
            let backend = FileBackend::open(&cfg.path)?;
            Ok(Arc::new(backend))
        }
    }
}
