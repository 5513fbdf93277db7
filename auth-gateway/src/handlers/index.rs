use crate::error::{GatewayError, Result};
use crate::state::GatewayState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub users: usize,
}

/// Liveness check
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse { status: "OK" })
}

/// Object counts
pub async fn stats(State(state): State<GatewayState>) -> Result<Json<StatsResponse>> {
    let users = state.users.count().await?;
    Ok(Json(StatsResponse { users }))
}

pub async fn unauthorized() -> GatewayError {
    GatewayError::Unauthorized
}

pub async fn forbidden() -> GatewayError {
    GatewayError::Forbidden
}

pub async fn not_found() -> GatewayError {
    GatewayError::NotFound
}
