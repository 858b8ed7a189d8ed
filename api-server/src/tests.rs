//! Router tests

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use queue_ml_core::{MlConfig, QueueMlService};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{config::Config, create_router, AppState};

fn app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let ml = MlConfig {
        n_estimators: 10,
        ..MlConfig::with_models_dir(dir.path())
    };
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        ml: ml.clone(),
    };
    let service = QueueMlService::open(ml).unwrap().into_shared();
    (create_router(AppState { service, config }), dir)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_reports_untrained() {
    let (app, _dir) = app();
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["trained"], false);
    assert_eq!(body["total_records"], 0);
    assert_eq!(body["trains_at"], 5);
    assert_eq!(body["buffer"]["current_size"], 0);
    assert_eq!(body["buffer"]["required_size"], 5);
    assert_eq!(body["buffer"]["is_ready"], false);
}

#[tokio::test]
async fn test_missing_payload_is_rejected() {
    let (app, _dir) = app();
    let (status, body) = send(&app, "POST", "/queue/joined", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid or missing JSON payload");
}

#[tokio::test]
async fn test_queue_joined_buffers() {
    let (app, _dir) = app();
    let record = json!({
        "service": "General",
        "positionInQueue": 2,
        "totalInQueue": 5,
        "waitingTime": 12.5,
        "status": "waiting",
        "joinedAt": "2024-03-15T10:30:00"
    });
    let (status, body) = send(&app, "POST", "/queue/joined", Some(record)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["buffered"], true);
    assert_eq!(body["buffer_size"], 1);
    assert_eq!(body["trains_at"], 5);
    assert_eq!(body["total_records"], 0);
}

#[tokio::test]
async fn test_untrained_predictions_use_fallbacks() {
    let (app, _dir) = app();
    let record = json!({ "service": "General", "positionInQueue": 4 });

    let (_, body) = send(&app, "POST", "/predict/waiting-time", Some(record.clone())).await;
    assert_eq!(body["waitingTime"], 8.0);
    assert_eq!(body["unit"], "minutes");

    let (_, body) = send(&app, "POST", "/predict/queue-length", Some(record.clone())).await;
    assert_eq!(body["queueLength"], 10);

    let (_, body) = send(&app, "POST", "/predict/no-show", Some(record.clone())).await;
    assert_eq!(body["noShowProbability"], 0.15);
    assert_eq!(body["percentage"], 15.0);

    let (_, body) = send(&app, "POST", "/predict/peak-hours", Some(record)).await;
    assert_eq!(body["queueDensity"], 20.0);
    assert_eq!(body["isPeak"], false);

    // Every candidate hour uses the per-task fallback and is still ranked
    let (_, body) = send(&app, "POST", "/suggest/best-time", Some(json!({ "dayOfWeek": 2 }))).await;
    let hours: Vec<u64> = body["suggestions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| {
            assert_eq!(s["queueLength"], 10);
            assert_eq!(s["waitingTime"], 2.0);
            s["hour"].as_u64().unwrap()
        })
        .collect();
    assert_eq!(hours, vec![9, 10, 11]);
}

#[tokio::test]
async fn test_malformed_fields_are_defaulted() {
    let (app, _dir) = app();
    let record = json!({
        "service": 7,
        "positionInQueue": "3",
        "noShow": "false",
        "joinedAt": 1700000000,
        "dayOfWeek": -1
    });

    let (status, body) = send(&app, "POST", "/predict/waiting-time", Some(record.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["waitingTime"], 6.0);

    let (status, body) = send(&app, "POST", "/queue/joined", Some(record)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["buffer_size"], 1);
}

#[tokio::test]
async fn test_seed_then_suggest() {
    let (app, _dir) = app();
    let (status, body) = send(&app, "POST", "/seed", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Seed complete");
    assert_eq!(body["trained"], true);
    assert_eq!(body["total_records"], 5);

    let (status, body) = send(&app, "POST", "/suggest/best-time", Some(json!({ "dayOfWeek": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    let suggestions = body["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 3);
    for slot in suggestions {
        let hour = slot["hour"].as_u64().unwrap();
        assert!((9..=17).contains(&hour));
        assert!(slot["queueLength"].as_i64().unwrap() >= 0);
        assert!(slot["waitingTime"].as_f64().unwrap() >= 0.0);
    }
}

#[tokio::test]
async fn test_train_endpoint() {
    let (app, _dir) = app();
    let (status, body) = send(&app, "POST", "/train", Some(json!({ "data": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No training data provided");

    let data: Vec<Value> = (0..6)
        .map(|i| json!({
            "service": if i % 2 == 0 { "General" } else { "Cardiology" },
            "positionInQueue": i + 1,
            "totalInQueue": i + 3,
            "waitingTime": 5 + 4 * i,
            "noShow": i == 3,
            "status": "waiting",
            "joinedAt": format!("2024-03-15T{:02}:00:00", 9 + i)
        }))
        .collect();
    let (status, body) = send(&app, "POST", "/train", Some(json!({ "data": data }))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["results"]["waitingTime"]["score"].is_number());
    assert!(body["results"]["peakHours"]["score"].is_number());
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _dir) = app();
    let (status, body) = send(&app, "GET", "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
}
