use std::sync::Arc;

use anyhow::{Context, Result};
use ironlog::Config;
use ironlog::auth::GoogleIdentityVerifier;
use ironlog::db::{self, SqliteRepository};
use ironlog_server::{AppState, app, logging};
use log::{debug, info, warn};
use tokio::net::TcpListener;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Invalid configuration")?;
    logging::init_logger(logging::level_for(config.debug));
    debug!("Loaded configuration: {:?}", config);

    let pool = db::connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    let identity = GoogleIdentityVerifier::from_config(&config)
        .context("Failed to build identity verifier")?;

    let bind_addr = config.bind_addr;
    let state = AppState::new(
        config,
        Arc::new(SqliteRepository::new(pool)),
        Arc::new(identity),
    );

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
