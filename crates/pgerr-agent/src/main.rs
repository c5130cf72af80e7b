//! pgerr agent: PostgreSQL error-log metrics exporter.
//!
//! Reads error-log lines from a file or stdin, feeds them to the collector
//! and serves the resulting counters on `/metrics`.

use prometheus::Registry;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use pgerr_agent::config::AgentConfig;
use pgerr_agent::{feeder, routes, shutdown};
use pgerr_collector::ErrorLogs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pgerr-agent starting");

    // ── Load config ─────────────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/pgerr/agent.toml".to_string());

    let config = AgentConfig::from_file(&config_path)?;
    tracing::info!(
        instance_key = %config.instance_key,
        log_format = %config.log_format,
        input = %config.input.path,
        "config loaded"
    );

    // ── Collector ───────────────────────────────────────────────
    let registry = Registry::new();
    let collector = ErrorLogs::new(config.collector_args(registry.clone()))?;
    collector.start()?;

    // ── Input ───────────────────────────────────────────────────
    let reader = feeder::open(&config.input.path).await?;
    let input = tokio::spawn(feeder::run(reader, collector.sender()));

    // ── Metrics endpoint ────────────────────────────────────────
    let app = routes::build_router(registry);
    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    tracing::info!("pgerr-agent ready");

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "metrics server exited unexpectedly");
            }
        }
        signal = shutdown::signal() => {
            tracing::info!(signal, "shutdown signal received");
        }
    }

    input.abort();
    collector.stop().await;

    tracing::info!("pgerr-agent stopped");
    Ok(())
}

