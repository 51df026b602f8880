use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::crawler::ReconcileError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("The lecture has overlapping schedule with other lectures: {0}")]
    LectureOverlap(String),

    #[error("Lecture is already in the timetable")]
    AlreadyAdded,

    #[error("Crawl aborted: {0}")]
    CrawlAborted(#[from] ReconcileError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Stable machine-readable code carried in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::LectureOverlap(_) => "LECTURE_OVERLAP",
            AppError::AlreadyAdded => "LECTURE_ALREADY_ADDED",
            AppError::CrawlAborted(_) => "CRAWL_ABORTED",
            AppError::Upstream(_) => "UPSTREAM_ERROR",
            AppError::Workbook(_) => "WORKBOOK_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, error_message) = match self {
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            e @ AppError::LectureOverlap(_) => (StatusCode::CONFLICT, e.to_string()),
            e @ AppError::AlreadyAdded => (StatusCode::CONFLICT, e.to_string()),
            e @ AppError::CrawlAborted(_) => {
                error!("crawl aborted: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            AppError::Upstream(e) => {
                error!("upstream error: {}", e);
                (StatusCode::BAD_GATEWAY, "Registration site request failed".to_string())
            }
            AppError::Workbook(msg) => {
                error!("workbook error: {}", msg);
                (StatusCode::BAD_GATEWAY, format!("Could not read lecture sheet: {}", msg))
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            code: code.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
