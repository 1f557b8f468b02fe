use analysis_worker::mistake::Mistake;
use analysis_worker::statistics::{opening_groups, sequence_groups, OpeningGroup, SequenceGroup};
use axum::response::Response;
use axum::{Extension, Json};

use crate::config::Config;
use crate::error::AppError;
use crate::routes::{raw_json, read_artifact};

async fn load_mistakes(config: &Config) -> Result<Vec<Mistake>, AppError> {
    match read_artifact(&config.mistakes_file()).await? {
        Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
        None => Ok(Vec::new()),
    }
}

/// GET /api/mistakes
pub async fn get_mistakes(Extension(config): Extension<Config>) -> Result<Response, AppError> {
    let body = read_artifact(&config.mistakes_file())
        .await?
        .unwrap_or_else(|| b"[]".to_vec());
    Ok(raw_json(body))
}

/// GET /api/mistakes/by-opening
pub async fn get_mistakes_by_opening(
    Extension(config): Extension<Config>,
) -> Result<Json<Vec<OpeningGroup>>, AppError> {
    let mistakes = load_mistakes(&config).await?;
    Ok(Json(opening_groups(&mistakes)))
}

/// GET /api/mistakes/by-sequence
pub async fn get_mistakes_by_sequence(
    Extension(config): Extension<Config>,
) -> Result<Json<Vec<SequenceGroup>>, AppError> {
    let mistakes = load_mistakes(&config).await?;
    Ok(Json(sequence_groups(&mistakes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde_json::{json, Value};

    const MISTAKES: &str = r#"[
      {"move_number": 2, "move": "Nf3", "best_move": "d4", "move_sequence": ["e4", "e5", "Nf3"],
       "eval_before": 15, "eval_after": -90, "eval_drop": -105, "opening": "Kings Pawn",
       "eco": "C20", "player_color": "white", "game_url": "https://g/1", "time_class": "blitz",
       "time_control": "180", "end_time": 1, "fen": "x", "result": "Win",
       "white": {"username": "a", "rating": 1}, "black": {"username": "b", "rating": 2}},
      {"move_number": 2, "move": "Qh5", "best_move": null, "move_sequence": ["e4", "e5", "Qh5"],
       "eval_before": 30, "eval_after": -200, "eval_drop": -230, "opening": "",
       "eco": "", "player_color": "white", "game_url": "https://g/2", "time_class": "rapid",
       "time_control": "600", "end_time": 2, "fen": "y", "result": "",
       "white": {"username": "a", "rating": 1}, "black": {"username": "c", "rating": 3}},
      {"move_number": 2, "move": "Nf3", "best_move": "d4", "move_sequence": ["e4", "e5", "Nf3"],
       "eval_before": 10, "eval_after": -100, "eval_drop": -110, "opening": "Kings Pawn",
       "eco": "C20", "player_color": "white", "game_url": "https://g/3", "time_class": "blitz",
       "time_control": "180", "end_time": 3, "fen": "x", "result": "Loss",
       "white": {"username": "a", "rating": 1}, "black": {"username": "d", "rating": 4}}
    ]"#;

    fn config_with(mistakes: Option<&str>) -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        if let Some(contents) = mistakes {
            std::fs::write(dir.path().join("mistakes.json"), contents).unwrap();
        }
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        (dir, config)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_mistakes_served_verbatim() {
        let (_dir, config) = config_with(Some(MISTAKES));
        let response = get_mistakes(Extension(config)).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert_eq!(body[1]["move"], "Qh5");
    }

    #[tokio::test]
    async fn test_missing_artifact_is_empty_list() {
        let (_dir, config) = config_with(None);
        let response = get_mistakes(Extension(config.clone())).await.unwrap();
        assert_eq!(body_json(response).await, json!([]));

        let Json(groups) = get_mistakes_by_sequence(Extension(config)).await.unwrap();
        assert!(groups.is_empty());
    }

    #[tokio::test]
    async fn test_by_opening_groups_and_sorts() {
        let (_dir, config) = config_with(Some(MISTAKES));
        let Json(groups) = get_mistakes_by_opening(Extension(config)).await.unwrap();
        let value = serde_json::to_value(&groups).unwrap();

        assert_eq!(value[0]["opening"], "Kings Pawn");
        assert_eq!(value[0]["count"], 2);
        assert_eq!(value[0]["mistakes"].as_array().unwrap().len(), 2);
        assert_eq!(value[1]["opening"], "Unknown");
    }

    #[tokio::test]
    async fn test_by_sequence_aggregates_occurrences() {
        let (_dir, config) = config_with(Some(MISTAKES));
        let Json(groups) = get_mistakes_by_sequence(Extension(config)).await.unwrap();
        let value = serde_json::to_value(&groups).unwrap();

        assert_eq!(value[0]["sequence"], "e4 e5 Nf3");
        assert_eq!(value[0]["move_count"], 3);
        assert_eq!(value[0]["occurrences"], 2);
        assert_eq!(value[0]["avg_eval_drop"], -107.5);
        assert_eq!(value[0]["player_color"], "white");
        assert_eq!(value[0]["games"][1]["game_url"], "https://g/3");
        assert_eq!(value[0]["games"][1]["black"]["username"], "d");
        assert_eq!(value[1]["opening"], "Unknown");
        assert_eq!(value[1]["games"][0]["best_move"], Value::Null);
    }

    #[tokio::test]
    async fn test_corrupt_artifact_is_server_error() {
        let (_dir, config) = config_with(Some("{oops"));
        let error = get_mistakes_by_opening(Extension(config)).await.unwrap_err();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["detail"].is_string());
    }
}
