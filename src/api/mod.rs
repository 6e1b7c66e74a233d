pub mod auth;

use anyhow::Result;
use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::extractors::AppState;
use crate::graphql::{graphiql, graphql_handler};

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new()
        .route("/status", get(status_handler))
        .route("/graphql", get(graphiql).post(graphql_handler))
        .nest("/auth", auth::create_router().await?);

    Ok(router)
}

/// Full application: service routes at the root, API under `/api`.
pub async fn create_app(app_state: AppState) -> Result<Router> {
    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api", create_router().await?)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Ok(app)
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    version: &'static str,
    database: &'static str,
    uptime_seconds: u64,
}

async fn status_handler(State(app_state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
        database: app_state.database.backend(),
        uptime_seconds: app_state.startup_time.elapsed().as_secs(),
    })
}

async fn root_handler() -> &'static str {
    "Filebox-RS: file records over GraphQL"
}

async fn health_handler(State(app_state): State<AppState>) -> &'static str {
    match app_state.database.health_check().await {
        Ok(_) => "OK",
        Err(_) => "Database connection failed",
    }
}
