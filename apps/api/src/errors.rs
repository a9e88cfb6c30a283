use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::worker::{ChannelError, WorkerExit};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Clients only ever see `{ error, details? }`. Worker failures carry the
/// worker's diagnostic text in `details`; bridge faults never do.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error("Worker failed ({exit})")]
    WorkerFailed { exit: WorkerExit, diagnostics: String },

    #[error("Worker timed out after {}s", .after.as_secs())]
    WorkerTimedOut { after: Duration, diagnostics: String },

    #[error("Worker artifact exceeded {limit} bytes")]
    ArtifactTooLarge { limit: usize },

    #[error("Worker channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON body of every non-2xx response from this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::WorkerTimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::WorkerFailed { .. }
            | AppError::ArtifactTooLarge { .. }
            | AppError::Channel(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::BadRequest(msg) => ErrorBody {
                error: "Invalid request body".to_string(),
                details: Some(msg),
            },
            AppError::WorkerFailed { exit, diagnostics } => {
                tracing::warn!("Worker failed with {exit}: {diagnostics}");
                ErrorBody {
                    error: "Document generation failed".to_string(),
                    details: Some(diagnostics),
                }
            }
            AppError::WorkerTimedOut { after, diagnostics } => {
                tracing::warn!("Worker killed after {}s without exiting", after.as_secs());
                ErrorBody {
                    error: "Document generation timed out".to_string(),
                    details: (!diagnostics.is_empty()).then_some(diagnostics),
                }
            }
            AppError::ArtifactTooLarge { limit } => {
                tracing::warn!("Worker artifact exceeded {limit} bytes, worker killed");
                ErrorBody {
                    error: "Generated document exceeds size limit".to_string(),
                    details: None,
                }
            }
            AppError::Channel(e) => {
                tracing::error!("Worker channel error: {e}");
                ErrorBody {
                    error: "Server error".to_string(),
                    details: None,
                }
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                ErrorBody {
                    error: "Server error".to_string(),
                    details: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
