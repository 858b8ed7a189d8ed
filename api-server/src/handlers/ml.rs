//! Prediction, ingestion and training handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use queue_ml_core::logic::model::metrics::round_to;
use queue_ml_core::{BestTimeSlot, IngestReceipt, QueueEventRecord, TrainingReport};
use serde::{Deserialize, Serialize};

use super::with_service;
use crate::{AppError, AppResult, AppState};

/// Density above which an hour counts as peak
const PEAK_THRESHOLD: f64 = 25.0;

const DEFAULT_SERVICE: &str = "General";

type Payload<T> = Result<Json<T>, JsonRejection>;

// ============================================================================
// REQUESTS / RESPONSES
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestTimeRequest {
    pub service: Option<String>,
    pub day_of_week: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TrainRequest {
    #[serde(default)]
    pub data: Vec<QueueEventRecord>,
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub trained: bool,
    pub total_records: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingTimeResponse {
    pub waiting_time: f64,
    pub unit: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueLengthResponse {
    pub queue_length: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoShowResponse {
    pub no_show_probability: f64,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakHoursResponse {
    pub queue_density: f64,
    pub is_peak: bool,
}

#[derive(Debug, Serialize)]
pub struct BestTimeResponse {
    pub suggestions: Vec<BestTimeSlot>,
}

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub message: String,
    pub results: TrainingReport,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Record a queue join; may retrain before responding
pub async fn queue_joined(
    State(state): State<AppState>,
    payload: Payload<QueueEventRecord>,
) -> AppResult<Json<IngestReceipt>> {
    let Json(record) = payload?;
    let receipt = with_service(&state, move |service| service.ingest(record)).await?;
    Ok(Json(receipt))
}

/// Ingest the bootstrap sample records
pub async fn seed(State(state): State<AppState>) -> AppResult<Json<SeedResponse>> {
    let status = with_service(&state, |service| service.seed()).await?;
    tracing::info!("Seeded sample data, trained: {}", status.is_trained);

    Ok(Json(SeedResponse {
        message: "Seed complete".to_string(),
        trained: status.is_trained,
        total_records: status.total_records,
    }))
}

pub async fn waiting_time(
    State(state): State<AppState>,
    payload: Payload<QueueEventRecord>,
) -> AppResult<Json<WaitingTimeResponse>> {
    let Json(record) = payload?;
    let waiting_time = with_service(&state, move |service| service.predict_waiting_time(&record)).await?;
    Ok(Json(WaitingTimeResponse { waiting_time, unit: "minutes" }))
}

pub async fn queue_length(
    State(state): State<AppState>,
    payload: Payload<QueueEventRecord>,
) -> AppResult<Json<QueueLengthResponse>> {
    let Json(record) = payload?;
    let queue_length = with_service(&state, move |service| service.predict_queue_length(&record)).await?;
    Ok(Json(QueueLengthResponse { queue_length }))
}

pub async fn no_show(
    State(state): State<AppState>,
    payload: Payload<QueueEventRecord>,
) -> AppResult<Json<NoShowResponse>> {
    let Json(record) = payload?;
    let probability = with_service(&state, move |service| service.predict_no_show(&record)).await?;
    Ok(Json(NoShowResponse {
        no_show_probability: probability,
        percentage: round_to(probability * 100.0, 1),
    }))
}

pub async fn peak_hours(
    State(state): State<AppState>,
    payload: Payload<QueueEventRecord>,
) -> AppResult<Json<PeakHoursResponse>> {
    let Json(record) = payload?;
    let density = with_service(&state, move |service| service.predict_peak_density(&record)).await?;
    Ok(Json(PeakHoursResponse {
        queue_density: density,
        is_peak: density > PEAK_THRESHOLD,
    }))
}

pub async fn best_time(
    State(state): State<AppState>,
    payload: Payload<BestTimeRequest>,
) -> AppResult<Json<BestTimeResponse>> {
    let Json(req) = payload?;
    let service_name = req.service.unwrap_or_else(|| DEFAULT_SERVICE.to_string());
    let suggestions = with_service(&state, move |service| {
        service.suggest_best_time(&service_name, req.day_of_week)
    })
    .await?;
    Ok(Json(BestTimeResponse { suggestions }))
}

/// Train every model on an explicit batch
pub async fn train(
    State(state): State<AppState>,
    payload: Payload<TrainRequest>,
) -> AppResult<Json<TrainResponse>> {
    let Json(req) = payload?;
    if req.data.is_empty() {
        return Err(AppError::BadRequest("No training data provided".to_string()));
    }

    let count = req.data.len();
    let results = with_service(&state, move |service| service.bulk_train(&req.data))
        .await?
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    tracing::info!("Bulk training on {} records finished", count);
    Ok(Json(TrainResponse {
        message: format!("Training complete on {} records", count),
        results,
    }))
}
