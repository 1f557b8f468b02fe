use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Io(e) => {
                tracing::error!("IO error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read analysis data".to_string())
            }
            AppError::Json(e) => {
                tracing::error!("Corrupt artifact: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Analysis data is not valid JSON".to_string())
            }
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}
