//! HashBucket HTTP Server binary

use anyhow::Context;
use hashbucket_server::{telemetry, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load(None).context("Failed to load configuration")?;

    if config.otel_enabled {
        telemetry::init_tracing_stack("hashbucket-server", &config.log_filter)?;
        info!("OpenTelemetry tracing enabled");
    } else {
        telemetry::init_console_logging(&config.log_filter)?;
        info!("Console logging enabled (set OTEL_ENABLED=true for OpenTelemetry)");
    }

    info!("Starting HashBucket HTTP Server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        bind_address = %config.bind_address,
        request_timeout_secs = config.request_timeout_secs,
        "Configuration loaded"
    );

    let otel_enabled = config.otel_enabled;
    let result = hashbucket_server::run(config).await;

    if otel_enabled {
        info!("Flushing OpenTelemetry traces...");
        telemetry::shutdown_telemetry();
    }

    result
}
