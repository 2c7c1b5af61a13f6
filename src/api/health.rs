//! Health check endpoints

use std::io;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    AppState,
};

#[derive(Serialize)]
pub struct HealthResponse {
    /// Current status of the service
    pub status: String,
    /// Version of the service
    pub version: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check endpoint (fails once the route table is shut down)
pub async fn readiness_check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    if state.services.pages.routes().is_shut_down() {
        return Err(AppError::Io(io::Error::new(
            io::ErrorKind::NotConnected,
            "route table is shut down",
        )));
    }
    Ok(Json(HealthResponse {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
