use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing car name in 'q' parameter")]
    MissingQuery,

    #[error("Search provider error: {0}")]
    Search(String),

    #[error("Completion provider error: {0}")]
    Completion(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::MissingQuery => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Missing car name in 'q' parameter".to_string(),
                    details: None,
                },
            ),
            AppError::Search(msg) | AppError::Completion(msg) | AppError::Config(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Search failed".to_string(),
                    details: Some(msg),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
