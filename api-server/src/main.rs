//! Queue ML Server
//!
//! HTTP front end for the adaptive queue prediction core.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    QUEUE ML SERVER                       │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐    ┌────────────────────────────────────┐ │
//! │  │  Router   │───▶│  Arc<Mutex<QueueMlService>>        │ │
//! │  │  (Axum)   │    │  buffer · slots · encoders · meta  │ │
//! │  └───────────┘    └─────────────────┬──────────────────┘ │
//! │                                     ▼                    │
//! │                          ┌──────────────────┐            │
//! │                          │  saved_models/   │            │
//! │                          └──────────────────┘            │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod handlers;
mod error;

#[cfg(test)]
mod tests;

use axum::{
    Router,
    routing::{get, post},
};
use queue_ml_core::{QueueMlService, SharedService};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "queue_ml_server=debug,queue_ml_core=info,tower_http=debug".into());
    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Queue ML Server starting...");
    tracing::info!("Models directory: {}", config.ml.models_dir.display());

    // Restore persisted models
    let service = QueueMlService::open(config.ml.clone())?.into_shared();

    // Build application state
    let state = AppState {
        service,
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: SharedService,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))

        // Ingestion
        .route("/queue/joined", post(handlers::ml::queue_joined))
        .route("/seed", post(handlers::ml::seed))

        // Predictions
        .route("/predict/waiting-time", post(handlers::ml::waiting_time))
        .route("/predict/queue-length", post(handlers::ml::queue_length))
        .route("/predict/no-show", post(handlers::ml::no_show))
        .route("/predict/peak-hours", post(handlers::ml::peak_hours))
        .route("/suggest/best-time", post(handlers::ml::best_time))

        // Training
        .route("/train", post(handlers::ml::train))

        .fallback(handlers::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
