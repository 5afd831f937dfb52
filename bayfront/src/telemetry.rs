//! Telemetry initialization: fmt tracing subscriber plus optional OpenTelemetry export.
//!
//! OTLP export is **disabled by default** and must be explicitly enabled via the
//! `enable_otel_export` configuration flag. When enabled, the exporter is configured
//! through the standard OpenTelemetry environment variables:
//!
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` - The OTLP endpoint URL
//! - `OTEL_EXPORTER_OTLP_PROTOCOL` - Protocol (http/protobuf, http/json)
//! - `OTEL_EXPORTER_OTLP_HEADERS` - Headers as comma-separated key=value pairs
//! - `OTEL_SERVICE_NAME` - Service name for resource identification

use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _; // Trait for .tracer() method
use opentelemetry_otlp::{Protocol, WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Global tracer provider reference for shutdown.
///
/// `tracing-opentelemetry` clones the tracer, not the provider, so we keep our
/// own reference to flush pending spans on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Initialize tracing with optional OpenTelemetry support
///
/// Sets up tracing-subscriber with console output (fmt layer) and, when
/// `enable_otel_export` is true and the environment is configured, an OTLP span
/// exporter layer.
pub fn init_telemetry(enable_otel_export: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if enable_otel_export {
        // Try to create the OTLP tracer - if env vars aren't set, fall back to fmt only
        match create_otlp_tracer() {
            Ok(tracer) => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer())
                    .with(tracing_opentelemetry::layer().with_tracer(tracer))
                    .try_init()?;

                info!("Telemetry initialized with OTLP export enabled");
            }
            Err(e) => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer())
                    .try_init()?;

                info!("Telemetry initialized without OTLP export: {}", e);
            }
        }
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()?;

        info!("Telemetry initialized (OTLP export disabled)");
    }

    Ok(())
}

/// Create an OpenTelemetry tracer with an OTLP exporter, configured from the
/// standard `OTEL_*` environment variables.
fn create_otlp_tracer() -> anyhow::Result<opentelemetry_sdk::trace::Tracer> {
    let service_name = std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "bayfront".to_string());
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").unwrap_or_else(|_| "http://localhost:4318".to_string());

    // Parse headers from the environment. Values may carry %20 for spaces since
    // environment variables and spaces don't mix well.
    let mut headers = HashMap::new();
    if let Ok(headers_str) = std::env::var("OTEL_EXPORTER_OTLP_HEADERS") {
        let decoded = headers_str.replace("%20", " ");
        for pair in decoded.split(',') {
            if let Some((key, value)) = pair.split_once('=') {
                headers.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }

    let protocol = match std::env::var("OTEL_EXPORTER_OTLP_PROTOCOL").as_deref().unwrap_or("http/protobuf") {
        "http/json" => Protocol::HttpJson,
        _ => Protocol::HttpBinary,
    };

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(&endpoint)
        .with_protocol(protocol)
        .with_headers(headers)
        .build()?;

    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            opentelemetry_sdk::Resource::builder()
                .with_attribute(KeyValue::new("service.name", service_name.clone()))
                .build(),
        )
        .build();

    let tracer = tracer_provider.tracer(service_name);

    let _ = TRACER_PROVIDER.set(tracer_provider);

    Ok(tracer)
}

/// Shutdown the global tracer provider gracefully
///
/// Should be called before application exit to flush any pending spans
pub fn shutdown_telemetry() {
    if let Some(provider) = TRACER_PROVIDER.get()
        && let Err(e) = provider.shutdown()
    {
        tracing::error!("Failed to shutdown tracer provider: {}", e);
    }
}
