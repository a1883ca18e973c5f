use axum::{response::Json, Extension};
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::models::Avatar;
use crate::error::ApiError;
use crate::middleware::AuthSession;
use crate::services::UserService;

/// GET /api/avatars - List the caller's avatars, newest first.
///
/// Runs on the service-role pool, which bypasses row-level authorization,
/// so the query filters by the resolved user id explicitly. An empty
/// collection is a successful response, not an error.
pub async fn list(Extension(session): Extension<AuthSession>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::service_pool()?;

    let user = UserService::new(pool.clone())
        .resolve_or_create(&session.claims)
        .await
        .map_err(|e| {
            tracing::warn!("User resolution failed for {}: {}", session.claims.sub, e);
            ApiError::not_found("User not found")
        })?;

    let avatars = sqlx::query_as::<_, Avatar>(
        r#"
        SELECT id, user_id, image_url, prompt, metadata, created_at
        FROM avatars
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user.id)
    .fetch_all(&pool)
    .await
    .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    Ok(Json(json!({ "avatars": avatars })))
}
