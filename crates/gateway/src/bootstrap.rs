//! AppState construction shared by `serve`, `intent` and the tests.

use std::sync::Arc;

use anyhow::Context;
use sha2::{Digest, Sha256};

use tk_carrier::{create_lookup, CarrierLookup};
use tk_domain::config::{Config, ConfigSeverity};
use tk_store::{open_backend, TrackingStore};

use crate::conversation::ConversationRouter;
use crate::state::AppState;

/// Validate config, open the store, build the carrier client and return
/// a fully-wired [`AppState`].
pub async fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Tracking store ───────────────────────────────────────────────
    let backend = open_backend(&config.store).context("opening tracking store")?;
    let store = TrackingStore::new(backend, config.store.table_name.clone());
    tracing::info!(
        backend = ?config.store.backend,
        table = %config.store.table_name,
        "tracking store ready"
    );

    // ── Carrier lookup ───────────────────────────────────────────────
    let carrier = create_lookup(&config.carrier).context("creating carrier lookup")?;
    tracing::info!(mode = ?config.carrier.mode, "carrier lookup ready");

    // ── API token (read once, hash for constant-time comparison) ────
    let api_token_hash = {
        let env_var = &config.server.api_token_env;
        match std::env::var(env_var).ok().filter(|t| !t.is_empty()) {
            Some(token) => {
                tracing::info!(source = %format!("env:{env_var}"), "API bearer-token auth enabled");
                Some(Sha256::digest(token.as_bytes()).to_vec())
            }
            None => {
                tracing::warn!("API bearer-token auth DISABLED, set the {env_var} env var to enable it");
                None
            }
        }
    };

    Ok(assemble(config, store, carrier, api_token_hash))
}

/// Wire already-built collaborators into an [`AppState`].
pub fn assemble(
    config: Arc<Config>,
    store: TrackingStore,
    carrier: Arc<dyn CarrierLookup>,
    api_token_hash: Option<Vec<u8>>,
) -> AppState {
    let conversation = Arc::new(ConversationRouter::new(
        store.clone(),
        carrier,
        config.conversation.clone(),
    ));
    AppState {
        config,
        store,
        conversation,
        api_token_hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tk_domain::config::{CarrierMode, StoreBackendKind};

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let mut config = Config::default();
        config.store.backend = StoreBackendKind::Memory;
        config.store.table_name = String::new();
        let err = build_app_state(Arc::new(config)).await.err().unwrap();
        assert!(err.to_string().contains("config validation failed"));
    }

    #[tokio::test]
    async fn memory_static_config_boots() {
        let mut config = Config::default();
        config.store.backend = StoreBackendKind::Memory;
        config.carrier.mode = CarrierMode::Static;
        config
            .carrier
            .static_results
            .insert("yamato_1".into(), tk_domain::config::StaticResult {
                success: true,
                status: "在途中".into(),
            });
        let state = build_app_state(Arc::new(config)).await.unwrap();
        assert_eq!(state.store.table(), "Tracking");
    }
}
