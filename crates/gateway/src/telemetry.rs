//! Tracing subscribers for the server and for one-shot CLI commands.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig as _;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use tk_domain::config::ObservabilityConfig;

const SERVE_FILTER: &str = "info,tk_gateway=debug,tk_store=debug,tk_carrier=debug";

/// JSON logs to stdout plus OTLP/gRPC span export when an endpoint is
/// configured.  The returned provider must be shut down on exit to flush
/// pending spans.
pub fn init_tracing(obs: &ObservabilityConfig) -> Option<SdkTracerProvider> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(SERVE_FILTER));

    let provider = obs.export_endpoint().and_then(|endpoint| {
        match build_provider(endpoint, obs) {
            Ok(p) => Some(p),
            Err(e) => {
                // The subscriber is not installed yet.
                eprintln!(
                    "WARNING: failed to create OTLP exporter for {endpoint}: {e}; \
                     starting without OpenTelemetry"
                );
                None
            }
        }
    });

    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(obs.service_name.clone())));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .with(otel_layer)
        .init();

    provider
}

fn build_provider(
    endpoint: &str,
    obs: &ObservabilityConfig,
) -> Result<SdkTracerProvider, Box<dyn std::error::Error + Send + Sync>> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(obs.service_name.clone())
        .build();

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(Sampler::TraceIdRatioBased(obs.sample_rate))
        .with_resource(resource)
        .build())
}

/// Compact stderr logging at `warn` so stdout stays clean for command output.
pub fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
