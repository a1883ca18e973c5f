use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Generated avatar belonging to exactly one user. Created by the generation
/// pipeline elsewhere; this API only reads them, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Avatar {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: Option<String>,
    pub prompt: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
