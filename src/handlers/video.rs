use axum::{extract::Path, response::Json};
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::models::{JobStatus, VideoJob};
use crate::error::ApiError;

/// GET /api/video/status/:job_id - Poll a faceless-video job.
///
/// An absent job and a failed lookup are both reported as 404; the caller
/// cannot distinguish them and retries by polling again.
pub async fn status(Path(job_id): Path<String>) -> Result<Json<Value>, ApiError> {
    if job_id.trim().is_empty() {
        return Err(ApiError::bad_request("Job ID is required"));
    }

    let pool = DatabaseManager::service_pool().map_err(|e| {
        tracing::warn!("Job lookup unavailable: {}", e);
        ApiError::not_found("Job not found")
    })?;

    let job = sqlx::query_as::<_, VideoJob>(
        r#"
        SELECT id, job_id, user_id, status, progress, progress_message,
               result, error, created_at, updated_at
        FROM video_jobs
        WHERE job_id = $1
        "#,
    )
    .bind(&job_id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::warn!("Job lookup failed for {}: {}", job_id, e);
        ApiError::not_found("Job not found")
    })?
    .ok_or_else(|| ApiError::not_found("Job not found"))?;

    Ok(Json(project_status(&job)))
}

/// GET /api/video/status - Path without a job id. Rejected before any
/// backend call is attempted.
pub async fn status_missing() -> ApiError {
    ApiError::bad_request("Job ID is required")
}

/// Conditional projection of a job row. `result` appears only for a
/// completed job that has one; `error` only for a failed job that has one.
/// A job cannot be both, so the two keys never co-occur.
fn project_status(job: &VideoJob) -> Value {
    let mut body = json!({
        "jobId": job.job_id,
        "status": job.status,
        "progress": job.progress.unwrap_or(0),
        "progressMessage": job.progress_message.clone().unwrap_or_default(),
    });

    match JobStatus::parse(&job.status) {
        Some(JobStatus::Completed) => {
            if let Some(result) = &job.result {
                body["result"] = result.clone();
            }
        }
        Some(JobStatus::Failed) => {
            if let Some(error) = &job.error {
                body["error"] = error.clone();
            }
        }
        _ => {}
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn job(status: &str) -> VideoJob {
        VideoJob {
            id: Uuid::new_v4(),
            job_id: "job_123".to_string(),
            user_id: None,
            status: status.to_string(),
            progress: None,
            progress_message: None,
            result: None,
            error: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn projects_in_flight_job_with_defaults() {
        let mut j = job("processing");
        j.progress = Some(42);

        let body = project_status(&j);
        assert_eq!(
            body,
            json!({
                "jobId": "job_123",
                "status": "processing",
                "progress": 42,
                "progressMessage": "",
            })
        );
        assert!(body.get("result").is_none());
        assert!(body.get("error").is_none());
    }

    #[test]
    fn completed_job_includes_result_not_error() {
        let mut j = job("completed");
        j.progress = Some(100);
        j.result = Some(json!({ "videoUrl": "https://cdn/video.mp4" }));
        j.error = Some(json!({ "message": "stale error left over" }));

        let body = project_status(&j);
        assert_eq!(body["result"], json!({ "videoUrl": "https://cdn/video.mp4" }));
        assert!(body.get("error").is_none());
    }

    #[test]
    fn failed_job_includes_error_not_result() {
        let mut j = job("failed");
        j.error = Some(json!({ "message": "render crashed" }));
        j.result = Some(json!({ "videoUrl": "should not leak" }));

        let body = project_status(&j);
        assert_eq!(body["error"], json!({ "message": "render crashed" }));
        assert!(body.get("result").is_none());
    }

    #[test]
    fn completed_without_result_omits_both_keys() {
        let body = project_status(&job("completed"));
        assert!(body.get("result").is_none());
        assert!(body.get("error").is_none());
    }

    #[test]
    fn unknown_status_passes_through_without_payloads() {
        let mut j = job("queued_externally");
        j.result = Some(json!({ "x": 1 }));

        let body = project_status(&j);
        assert_eq!(body["status"], "queued_externally");
        assert!(body.get("result").is_none());
    }
}
