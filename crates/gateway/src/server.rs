//! `takuhai serve`: bind, layer and run the HTTP API until a signal.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use opentelemetry_sdk::trace::SdkTracerProvider;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use tk_domain::config::{Config, CorsConfig};

use crate::{api, bootstrap};

const ALLOWED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

pub async fn run_server(
    config: Arc<Config>,
    tracer_provider: Option<SdkTracerProvider>,
) -> anyhow::Result<()> {
    tracing::info!("takuhai starting");

    let state = bootstrap::build_app_state(config.clone()).await?;

    // ── Concurrency limit (backpressure protection) ────────────────
    let max_concurrent = config.server.max_concurrent_requests;
    tracing::info!(max_concurrent, "concurrency limit set");

    // ── Rate-limit layer (per-IP token bucket via governor) ─────────
    let governor_layer = match config.server.rate_limit.as_ref() {
        Some(rl) => {
            use tower_governor::governor::GovernorConfigBuilder;
            use tower_governor::GovernorLayer;

            let gov_config = GovernorConfigBuilder::default()
                .per_second(rl.requests_per_second)
                .burst_size(rl.burst_size)
                .finish()
                .context("rate_limit: requests_per_second and burst_size must be > 0")?;
            tracing::info!(
                requests_per_second = rl.requests_per_second,
                burst_size = rl.burst_size,
                "per-IP rate limiting enabled"
            );
            Some(GovernorLayer {
                config: Arc::new(gov_config),
            })
        }
        None => {
            tracing::info!("per-IP rate limiting disabled (no [server.rate_limit] in config)");
            None
        }
    };

    let router = api::router(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&config.server.cors))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_concurrent));
    let app = match governor_layer {
        Some(gov) => router.layer(gov).with_state(state.clone()),
        None => router.with_state(state.clone()),
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;
    tracing::info!(addr = %addr, "takuhai listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("axum server error")?;

    // ── Post-shutdown flush ─────────────────────────────────────────
    tracing::info!("server stopped, flushing tracking store");
    if let Err(e) = state.store.flush().await {
        tracing::warn!(error = %e, "tracking store flush on shutdown failed");
    }
    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = ?e, "OpenTelemetry tracer provider shutdown failed");
        }
    }
    tracing::info!("shutdown complete");

    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
                    _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM, waiting for SIGINT only");
                let _ = ctrl_c.await;
                tracing::info!("received SIGINT, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        tracing::info!("received SIGINT, shutting down");
    }
}

// ── CORS ──────────────────────────────────────────────────────────────

/// Allowed origins split into exact matches and `scheme://host:*` entries
/// that accept any numeric port.
#[derive(Debug, Clone, Default)]
struct OriginRules {
    exact: Vec<String>,
    any_port: Vec<String>,
}

impl OriginRules {
    fn parse(origins: &[String]) -> Self {
        let mut rules = Self::default();
        for origin in origins {
            match origin.strip_suffix('*') {
                Some(prefix) if prefix.ends_with(':') => rules.any_port.push(prefix.to_owned()),
                _ => rules.exact.push(origin.clone()),
            }
        }
        rules
    }

    fn allows(&self, origin: &str) -> bool {
        self.exact.iter().any(|e| e == origin)
            || self.any_port.iter().any(|prefix| {
                origin
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
            })
    }
}

fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // allow_credentials is incompatible with a wildcard origin.
    if cors.allowed_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured with wildcard \"*\", all origins allowed");
        return base.allow_origin(tower_http::cors::Any);
    }

    let rules = OriginRules::parse(&cors.allowed_origins);
    let allow_origin = if rules.any_port.is_empty() {
        let exact: Vec<HeaderValue> = rules
            .exact
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(hv) => Some(hv),
                Err(_) => {
                    tracing::warn!(origin = %o, "invalid CORS origin, skipping");
                    None
                }
            })
            .collect();
        AllowOrigin::list(exact)
    } else {
        AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin.to_str().map(|o| rules.allows(o)).unwrap_or(false)
        })
    };

    base.allow_origin(allow_origin).allow_credentials(true)
}
