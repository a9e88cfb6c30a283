//! Axum route handlers for the Generation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::generation::bridge::Artifact;
use crate::models::document::DocumentRequest;
use crate::state::AppState;

/// POST /generate
///
/// Runs one worker for the request and streams its artifact back as a PDF
/// attachment. Worker failures become 500 `{error, details}`.
pub async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<DocumentRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    info!("Generation requested: doc_type={}", request.archetype());

    let artifact = state.bridge.generate(&request).await?;
    pdf_response(artifact)
}

fn pdf_response(artifact: Artifact) -> Result<Response, AppError> {
    let disposition = content_disposition(&artifact.suggested_filename)?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response())
}

/// `attachment; filename=<name>`, with header-unsafe characters replaced.
/// Names that needed replacing also get an RFC 5987 `filename*` carrying the
/// original UTF-8 name.
fn content_disposition(filename: &str) -> Result<HeaderValue, AppError> {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && !matches!(c, '"' | '\\' | ';' | ',') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut value = format!("attachment; filename={safe}");
    if safe != filename {
        value.push_str("; filename*=UTF-8''");
        for byte in filename.bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-' | b'_' | b'~') {
                value.push(byte as char);
            } else {
                value.push_str(&format!("%{byte:02X}"));
            }
        }
    }

    HeaderValue::from_str(&value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid Content-Disposition: {e}")))
}
