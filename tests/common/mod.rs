use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use visage_api::auth::{issue_token, Claims};

/// Drive the router in-process; no listener, no live database. Handlers
/// that would touch the backend see connection failures, which is exactly
/// what the error contracts under test map to status codes.
pub async fn request(req: Request<Body>) -> Result<Response<Body>> {
    // Point the pool at a closed port so backend calls fail fast and
    // deterministically, regardless of the host environment.
    std::env::set_var("DATABASE_URL", "postgres://visage@127.0.0.1:1/visage_test");

    let app = visage_api::routes::app();
    Ok(app.oneshot(req).await?)
}

pub async fn body_json(response: Response<Body>) -> Result<(StatusCode, Value)> {
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let value = serde_json::from_slice(&bytes)?;
    Ok((status, value))
}

/// Mint a session token the way the identity provider would, using the
/// development signing secret.
pub fn session_token(sub: &str) -> String {
    let claims = Claims::new(
        sub.to_string(),
        Some(format!("{sub}@example.com")),
        Some("Test User".to_string()),
    );
    issue_token(&claims).expect("session token")
}
