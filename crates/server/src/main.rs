//! Market Data Chat Gateway - Entry Point

use std::net::SocketAddr;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use mdgate_config::{load_settings, Settings, StoreBackend};
use mdgate_gateway::{spawn_cache_janitor, spawn_session_janitor};
use mdgate_server::{create_router, init_metrics, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Warning: failed to load config: {e}. Using defaults.");
            Settings::default()
        }
    };

    init_tracing(&config);

    tracing::info!("Starting mdgate v{}", env!("CARGO_PKG_VERSION"));

    if config.store.backend == StoreBackend::Scylla {
        tracing::warn!(
            "ScyllaDB backend requested but the scylla-backend integration is not wired into \
             the server binary yet; falling back to the embedded in-memory store"
        );
    }

    let metrics_handle = init_metrics();
    tracing::info!("Initialized Prometheus metrics at /metrics");

    let session_cleanup = Duration::from_secs(config.session.cleanup_interval_minutes * 60);
    let cache_cleanup = Duration::from_secs(config.cache.cleanup_interval_minutes * 60);

    let state = AppState::new(config.clone(), metrics_handle);

    let _session_janitor = spawn_session_janitor(state.gate.clone(), session_cleanup);
    let _cache_janitor = spawn_cache_janitor(state.orchestrator.cache(), cache_cleanup);
    tracing::info!("Background janitors started");

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn init_tracing(_config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mdgate=info,tower_http=debug".into());

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let json_output = std::env::var("MDGATE_LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let fmt_layer = if json_output {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
