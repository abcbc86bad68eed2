use std::sync::Arc;

use tk_domain::config::Config;
use tk_store::TrackingStore;

use crate::conversation::ConversationRouter;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// The same store instance the router writes through; the
    /// maintenance routes read and delete via this handle.
    pub store: TrackingStore,
    pub conversation: Arc<ConversationRouter>,
    /// SHA-256 hash of the API bearer token (read once at startup).
    /// `None` = dev mode (no auth enforced).
    pub api_token_hash: Option<Vec<u8>>,
}
