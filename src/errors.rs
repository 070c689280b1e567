use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

// --- Domain/Infrastructure Errors ---

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Database backend error: {0}")]
    BackendError(#[from] anyhow::Error), // Wrap Anyhow errors from DB layer
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Media host rejected the upload: {0}")]
    Rejected(String),

    #[error("Media host returned an unusable response: {0}")]
    InvalidResponse(String),

    #[error("Media backend error: {0}")]
    BackendError(#[from] anyhow::Error),
}

// --- Web Layer Error ---

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No image uploaded")]
    NoImageUploaded,
    #[error("Birthday not found with ID: {0}")]
    BirthdayNotFound(String),

    #[error("Image upload failed")]
    UploadError(#[source] UploadError),
    #[error("Database error")]
    RepositoryError(#[source] RepoError),

    #[error("Error processing multipart form data: {0}")]
    MultipartError(#[from] axum::extract::multipart::MultipartError),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        AppError::RepositoryError(err)
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::UploadError(err)
    }
}

// --- Axum Response Implementation ---

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::NoImageUploaded => {
                tracing::warn!("Submission rejected: no image uploaded");
                (StatusCode::BAD_REQUEST, serde_json::json!({ "error": "No image uploaded" }))
            }
            // Lookups that match nothing answer with `message`, not `error`.
            AppError::BirthdayNotFound(id) => {
                tracing::warn!(birthday_id = %id, "No birthday found");
                (StatusCode::NOT_FOUND, serde_json::json!({ "message": "Birthday not found" }))
            }
            AppError::UploadError(e) => {
                tracing::error!(error.source = ?e, "Image upload error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, serde_json::json!({ "error": "Image upload failed" }))
            }
            AppError::RepositoryError(e) => {
                tracing::error!(error.source = ?e, "Repository error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, serde_json::json!({ "error": "Database error" }))
            }
            // Only reachable when an upload cap is configured.
            AppError::MultipartError(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                tracing::warn!(error.source = ?e, "Upload exceeds the configured size limit");
                (StatusCode::PAYLOAD_TOO_LARGE, serde_json::json!({ "error": "Image too large" }))
            }
            AppError::MultipartError(e) => {
                tracing::error!(error.source = ?e, "Failed to read multipart body");
                internal_server_error_body()
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                internal_server_error_body()
            }
        };

        (status, Json(body)).into_response()
    }
}

fn internal_server_error_body() -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        serde_json::json!({ "error": "Internal server error" }),
    )
}

/// Response used by the panic-catching layer so a crashed handler still
/// answers with the generic JSON error.
pub fn panic_response(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::InternalServerError(format!("handler panicked: {}", detail)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn status_and_body(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_uses_message_key() {
        let (status, body) = status_and_body(AppError::BirthdayNotFound("7".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "message": "Birthday not found" }));
    }

    #[tokio::test]
    async fn repo_errors_hide_backend_detail() {
        let err = RepoError::BackendError(anyhow::anyhow!("connection refused"));
        let (status, body) = status_and_body(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Database error" }));
    }

    #[tokio::test]
    async fn upload_errors_map_to_upload_failed() {
        let err = UploadError::Rejected("Invalid image file".into());
        let (status, body) = status_and_body(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Image upload failed" }));
    }

    #[tokio::test]
    async fn panics_become_internal_server_error() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Internal server error" }));
    }
}
