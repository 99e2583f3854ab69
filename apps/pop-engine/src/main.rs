//! PoP Engine Binary
//!
//! Serves probability-of-profit estimates over HTTP.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin pop-engine
//! ```
//!
//! # Environment Variables
//!
//! - `POP_ENGINE_CONFIG`: path to a YAML config (default: `config.yaml`, then built-in defaults)
//! - `SERVER_PORT`, `POP_TRIALS`, `POP_SEED`, `POP_WORKERS`, ...: interpolated into the config
//! - `RUST_LOG`: log filter, overrides `observability.logging.level`

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use pop_engine::config::{CONFIG_PATH_ENV, Config, load_config_or_default};
use pop_engine::infrastructure::http::{AppState, create_router};
use pop_engine::observability::{MetricsConfig, init_metrics};
use pop_engine::pricing::IvSolver;
use pop_engine::simulation::{PopEstimator, configure_thread_pool};
use pop_engine::telemetry::init_tracing;
use pop_engine::volatility::{ImpliedFromPremium, MetricsObserver, TracingObserver};
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var(CONFIG_PATH_ENV).ok();
    let config =
        load_config_or_default(config_path.as_deref()).context("Failed to load configuration")?;

    init_tracing(&config.observability.logging).context("Failed to initialise tracing")?;

    tracing::info!("Starting PoP engine");
    log_config(&config);

    if config.observability.metrics.enabled {
        let metrics = MetricsConfig::with_addr(config.observability.metrics.listen_addr);
        init_metrics(&metrics).context("Failed to start metrics exporter")?;
        tracing::info!(addr = %metrics.listen_addr, "Prometheus exporter listening");
    }

    configure_thread_pool(config.simulation.max_threads)
        .context("Failed to configure worker pool")?;

    let estimator = create_estimator(&config);
    let state = AppState::new(
        Arc::new(estimator),
        config.pricing.clone(),
        env!("CARGO_PKG_VERSION"),
    );

    start_http_server(&config, state).await?;

    tracing::info!("PoP engine stopped");
    Ok(())
}

/// Log the loaded configuration.
fn log_config(config: &Config) {
    tracing::info!(
        http_port = config.server.http_port,
        trials = config.simulation.trials,
        workers = config.simulation.workers,
        seed = ?config.simulation.seed,
        unrecognized_legs = ?config.simulation.unrecognized_legs,
        risk_free_rate = config.pricing.risk_free_rate,
        days_per_year = config.pricing.days_per_year,
        "Configuration loaded"
    );
}

/// Build the estimator with premium-implied volatilities.
fn create_estimator(config: &Config) -> PopEstimator {
    let source = ImpliedFromPremium::new(IvSolver::new(config.solver.clone()));

    PopEstimator::new(config.simulation.clone(), Arc::new(source))
        .with_observer(Arc::new((TracingObserver, MetricsObserver)))
}

/// Serve HTTP until a shutdown signal arrives.
async fn start_http_server(config: &Config, state: AppState) -> anyhow::Result<()> {
    let app = create_router(state);

    let http_addr: SocketAddr = format!(
        "{}:{}",
        config.server.bind_address, config.server.http_port
    )
    .parse()
    .context("Invalid server bind address")?;

    tracing::info!(%http_addr, "HTTP server starting");
    tracing::info!("Endpoints:");
    tracing::info!("  POST /pop");
    tracing::info!("  GET  /status");
    tracing::info!("  GET  /health");

    let listener = TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("Failed to bind {http_addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
