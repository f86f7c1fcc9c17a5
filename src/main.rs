use anyhow::Context;
use tokio::signal;

use odonto_backend::{build_router, config, middleware, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first
    let config = config::Settings::new().context("failed to load configuration")?;

    middleware::init_logging(&config.log_level, &config.log_format)?;

    tracing::info!("Starting odonto-backend v{}", env!("CARGO_PKG_VERSION"));

    let addr = config.bind_address();
    let app_state = AppState::new(config)
        .await
        .context("failed to initialize document store")?;
    let store = app_state.store.clone();

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Server starting on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
