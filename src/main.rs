use std::net::SocketAddr;

use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use linkbio::repository::AnalyticsRepository;
use linkbio::{
    build_router, open_database, serve_with_grace, AnalyticsRecorder, AppState, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the logger reads LOG_LEVEL and ENVIRONMENT
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("Starting linkbio...");

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Environment: {}, Server: {}, Log level: {}",
        config.environment,
        config.server_address(),
        config.log_level
    );

    let db = open_database(&config.database_path).await?;

    let (recorder, recorder_handle) = AnalyticsRecorder::spawn(
        AnalyticsRepository::new(db.clone()),
        config.analytics_queue_capacity,
    );

    let state = AppState::new(db.clone(), config.clone(), recorder);
    let app = build_router(state);

    let addr: SocketAddr = config.server_address().parse()?;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let clean = serve_with_grace(listener, app, shutdown_signal(), config.shutdown_grace()).await?;

    tracing::info!(clean, "Server stopped, draining analytics...");
    recorder_handle.shutdown(config.shutdown_grace()).await;

    db.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` overrides LOG_LEVEL.
fn init_tracing() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let production = std::env::var("ENVIRONMENT").is_ok_and(|env| env == "production");

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("linkbio={},tower_http=debug", log_level).into());

    let registry = tracing_subscriber::registry().with(filter);

    if production {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
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
}
