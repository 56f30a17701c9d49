use clap::Parser;
use sms_alert_relay::{config, http, metrics, signal_handler, Args};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Register metrics
    metrics::register_metrics();

    // Parse config
    let args = Args::parse();
    let config = config::Config::from_file(&args.config)?;

    // Handle signals
    signal_handler();

    // Start the HTTP server
    http::create_server(config).await
}
