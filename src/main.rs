use anyhow::{Context, Result};
use filebox_rs::api;
use filebox_rs::auth::AppState;
use filebox_rs::config::AppConfig;
use filebox_rs::database::Database;
use filebox_rs::services::SeedingService;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filebox_rs=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new().context("Failed to load configuration")?;
    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let database = Database::new(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    info!("Database ready ({})", database.backend());

    let app_state = AppState::new(database, &config).context("Failed to initialize application state")?;

    if config.database.seed {
        let seeding = SeedingService::new(app_state.file_service.store().clone());
        match seeding.seed_if_empty().await? {
            Some(scenario) => info!("Seeded {} fixture files", scenario.len()),
            None => info!("Seeding skipped, files already present"),
        }
    }

    if config.upload.filestack_api_key.is_empty() {
        warn!("FILESTACK_API_KEY is not set; the upload client will be rejected by the store");
    }

    let app = api::create_app(app_state).await?;
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Filebox-RS listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to listen for SIGTERM: {}", e);
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
