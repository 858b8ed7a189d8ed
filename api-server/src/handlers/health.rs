//! Health check handler

use axum::{extract::State, Json};
use queue_ml_core::{BufferStatus, ModelStatus};
use serde::Serialize;

use super::with_service;
use crate::{AppResult, AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    timestamp: i64,
    trained: bool,
    total_records: u64,
    buffer_size: usize,
    trains_at: usize,
    buffer: BufferStatus,
    models: Vec<ModelStatus>,
}

pub async fn check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let status = with_service(&state, |service| service.status()).await?;

    Ok(Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        timestamp: chrono::Utc::now().timestamp(),
        trained: status.is_trained,
        total_records: status.total_records,
        buffer_size: status.buffer_size,
        trains_at: status.retrain_threshold,
        buffer: status.buffer,
        models: status.models,
    }))
}
