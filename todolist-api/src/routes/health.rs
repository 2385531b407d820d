/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "storage": "postgres"
/// }
/// ```
///
/// With PostgreSQL behind the service, a failed ping reports `degraded`.

use crate::app::{AppState, Backend};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use todolist_shared::db::health_check as ping_database;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Storage backend in use (`memory` or `postgres`)
    pub storage: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let healthy = match &state.backend {
        Backend::Memory => true,
        Backend::Postgres(pool) => match ping_database(pool).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Database ping failed");
                false
            }
        },
    };

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.backend.name().to_string(),
    })
}
