//! Checkmark todo API server.
//!
//! # Usage
//!
//! ```bash
//! CHECKMARK_DATABASE_URL=sqlite://todos.sqlite3 PORT=3000 cargo run --bin checkmark-server
//! ```

use anyhow::Context;
use checkmark_server::{build_app, Config};
use checkmark_sqlite::SqliteTodoRepository;
use checkmark_web::AppState;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkmark_server=info,checkmark_web=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        database_url = %config.database.url,
        address = %config.server.address(),
        api_prefix = %config.server.api_prefix,
        "Configuration loaded"
    );

    let repository = SqliteTodoRepository::connect(
        &config.database.url,
        config.database.max_connections,
    )
    .await
    .with_context(|| format!("Failed to open record store at {}", config.database.url))?;

    let state = AppState::with_defaults(Arc::new(repository.clone()));
    let app = build_app(&config.server.api_prefix, state);

    let listener = tokio::net::TcpListener::bind(config.server.address())
        .await
        .with_context(|| format!("Failed to bind {}", config.server.address()))?;
    info!(address = %config.server.address(), "Server listening");

    let (stopping_tx, mut stopping_rx) = watch::channel(false);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = stopping_tx.send(true);
    });

    let drain_timeout = config.server.shutdown_timeout();
    tokio::select! {
        result = std::future::IntoFuture::into_future(server) => {
            result.context("Server error")?;
        },
        () = async {
            let _ = stopping_rx.wait_for(|stopping| *stopping).await;
            tokio::time::sleep(drain_timeout).await;
        } => {
            warn!(timeout_secs = drain_timeout.as_secs(), "In-flight requests did not finish before the shutdown timeout");
        },
    }

    repository.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
