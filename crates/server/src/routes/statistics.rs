use axum::response::Response;
use axum::Extension;

use crate::config::Config;
use crate::error::AppError;
use crate::routes::{raw_json, read_artifact};

/// GET /api/statistics
///
/// Served as stored so the count-sorted key order survives.
pub async fn get_statistics(Extension(config): Extension<Config>) -> Result<Response, AppError> {
    let body = read_artifact(&config.statistics_file())
        .await?
        .unwrap_or_else(|| b"{}".to_vec());
    Ok(raw_json(body))
}
