use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;

pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Video job status is path-scoped by id, no session required
        .merge(video_routes())
        // Protected API (bearer token required)
        .merge(avatar_routes())
        .merge(upload_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn avatar_routes() -> Router {
    use handlers::avatars;

    Router::new()
        .route("/api/avatars", get(avatars::list))
        .route_layer(axum::middleware::from_fn(
            crate::middleware::auth::require_auth,
        ))
}

fn video_routes() -> Router {
    use handlers::video;

    Router::new()
        // Bare route catches a missing job id before any backend call
        .route("/api/video/status", get(video::status_missing))
        .route("/api/video/status/:job_id", get(video::status))
}

fn upload_routes() -> Router {
    use axum::routing::post;
    use handlers::uploads;

    Router::new()
        .route("/api/uploads/sign", post(uploads::sign))
        .route_layer(axum::middleware::from_fn(
            crate::middleware::auth::require_auth,
        ))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Visage API",
        "version": version,
        "description": "Avatar and faceless-video backend API",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "avatars": "GET /api/avatars (protected)",
            "video_status": "GET /api/video/status/:job_id (public)",
            "sign_upload": "POST /api/uploads/sign (protected)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
