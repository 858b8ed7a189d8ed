//! HTTP handlers

pub mod health;
pub mod ml;

use queue_ml_core::QueueMlService;

use crate::{AppResult, AppState};

/// Run `f` under the service lock on the blocking pool
pub(crate) async fn with_service<T, F>(state: &AppState, f: F) -> AppResult<T>
where
    F: FnOnce(&mut QueueMlService) -> T + Send + 'static,
    T: Send + 'static,
{
    let service = state.service.clone();
    let value = tokio::task::spawn_blocking(move || f(&mut service.lock())).await?;
    Ok(value)
}

pub async fn not_found() -> crate::AppError {
    crate::AppError::NotFound("Route not found".to_string())
}
