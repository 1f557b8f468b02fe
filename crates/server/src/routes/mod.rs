pub mod health;
pub mod mistakes;
pub mod statistics;

use std::io::ErrorKind;
use std::path::Path;

use axum::http::{header, Uri};
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Raw bytes of a JSON artifact, `None` if it has not been produced yet.
pub(crate) async fn read_artifact(path: &Path) -> Result<Option<Vec<u8>>, AppError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Respond with already-serialized JSON, preserving its key order.
pub(crate) fn raw_json(body: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
