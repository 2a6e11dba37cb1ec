//! Logging and OpenTelemetry setup for the HashBucket server

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{self, RandomIdGenerator, Sampler},
    Resource,
};
use std::time::Duration;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Initialize OpenTelemetry with OTLP exporter
pub fn init_telemetry(service_name: &str) -> anyhow::Result<opentelemetry_sdk::trace::Tracer> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    let resource = Resource::new(vec![
        KeyValue::new("service.name", service_name.to_string()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_secs(3));

    let sample_arg = std::env::var("OTEL_TRACES_SAMPLER_ARG").ok();

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(
            trace::config()
                .with_sampler(sampler_from(sample_arg.as_deref()))
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(resource),
        )
        .install_batch(runtime::Tokio)?;

    Ok(tracer)
}

/// Sampler for an `OTEL_TRACES_SAMPLER_ARG` value; unset or unparsable means sample everything
fn sampler_from(arg: Option<&str>) -> Sampler {
    let sample_rate = arg.and_then(|s| s.parse::<f64>().ok()).unwrap_or(1.0);

    if sample_rate >= 1.0 {
        Sampler::AlwaysOn
    } else if sample_rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(sample_rate)
    }
}

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Console-only logging
pub fn init_console_logging(default_filter: &str) -> anyhow::Result<()> {
    Registry::default()
        .with(env_filter(default_filter))
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;
    Ok(())
}

/// Initialize the complete tracing stack (console + OpenTelemetry)
pub fn init_tracing_stack(service_name: &str, default_filter: &str) -> anyhow::Result<()> {
    let tracer = init_telemetry(service_name)?;
    let otel_layer = OpenTelemetryLayer::new(tracer);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_thread_ids(true)
        .with_thread_names(true);

    Registry::default()
        .with(env_filter(default_filter))
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(())
}

/// Shutdown OpenTelemetry provider
pub fn shutdown_telemetry() {
    opentelemetry::global::shutdown_tracer_provider();
}

/// Span wrapping one prediction
pub fn prediction_span(value_kind: &str, num_buckets: u64) -> tracing::Span {
    tracing::info_span!(
        "predict",
        value_kind = %value_kind,
        num_buckets,
        otel.kind = "server",
        otel.status_code = tracing::field::Empty,
        bucket = tracing::field::Empty,
    )
}

/// Record the chosen bucket in the current span
pub fn record_bucket(bucket: u64) {
    let span = tracing::Span::current();
    span.record("bucket", bucket);
    span.record("otel.status_code", "OK");
}
