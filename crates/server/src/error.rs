//! Application error handling

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use nlq_core::EngineError;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    /// Recoverable engine outcome (no entities, unsupported intent,
    /// missing identifier)
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Unsupported resource category: {0}")]
    UnsupportedResource(String),

    /// Model inference call failed
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Downstream records API returned a non-success status; status and
    /// body pass through to the caller
    #[error("Upstream error ({status})")]
    Upstream { status: u16, body: String },

    #[error("{0}")]
    NotImplemented(String),

    #[error("{0}")]
    Internal(String),
}

/// Wire shape of every error response
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: msg,
                    resource: None,
                },
            ),
            AppError::Engine(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    error: err.to_string(),
                    resource: err.resource().map(String::from),
                },
            ),
            AppError::UnsupportedResource(category) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    error: format!("Unsupported resource category: {category}"),
                    resource: Some(category),
                },
            ),
            AppError::Inference(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorBody {
                    error: msg,
                    resource: None,
                },
            ),
            AppError::Upstream { status, body } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                ErrorBody {
                    error: body,
                    resource: None,
                },
            ),
            AppError::NotImplemented(msg) => (
                StatusCode::NOT_IMPLEMENTED,
                ErrorBody {
                    error: msg,
                    resource: None,
                },
            ),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: msg,
                        resource: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
