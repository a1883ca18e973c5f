use axum::{response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthSession;
use crate::services::StorageService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUploadRequest {
    pub file_name: String,
    #[serde(default)]
    pub file_type: Option<String>,
}

/// POST /api/uploads/sign - Mint a signed upload URL for the caller.
///
/// The path is scoped under the caller's temporary prefix; whether this
/// client may sign at all is the storage backend's policy, not ours.
pub async fn sign(
    Extension(session): Extension<AuthSession>,
    Json(request): Json<SignUploadRequest>,
) -> Result<Json<Value>, ApiError> {
    let signed = StorageService::from_config().sign_upload(
        &session.claims.sub,
        &request.file_name,
        request.file_type.as_deref(),
    )?;

    Ok(Json(json!({
        "signedUrl": signed.signed_url,
        "token": signed.token,
        "path": signed.path,
        "publicUrl": signed.public_url,
    })))
}
