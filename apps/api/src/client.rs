//! Client transport: submits an assembled form to `POST /generate` and hands
//! back the downloaded document. One attempt per submit, never retried.
#![allow(dead_code)]

use bytes::Bytes;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::errors::ErrorBody;
use crate::form::{assemble, FormState};
use crate::models::document::DocumentRequest;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx answer. `message` is the server's `error` field, or the
    /// status' reason phrase when the body is not the structured shape.
    #[error("Generation failed: {message}")]
    Server {
        status: u16,
        message: String,
        details: Option<String>,
    },

    #[error("An error occurred while generating the document: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct DownloadedDocument {
    pub filename: String,
    pub bytes: Bytes,
}

#[derive(Clone)]
pub struct GenerationClient {
    client: Client,
    base_url: String,
}

impl GenerationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Assembles the form for its active archetype and submits it.
    pub async fn submit_form(&self, form: &FormState) -> Result<DownloadedDocument, ClientError> {
        self.submit(&assemble(form)).await
    }

    pub async fn submit(&self, request: &DocumentRequest) -> Result<DownloadedDocument, ClientError> {
        let url = format!("{}/generate", self.base_url);
        debug!("Submitting {} request to {url}", request.archetype());

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let (message, details) = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => (body.error, body.details),
                Err(_) => (
                    status
                        .canonical_reason()
                        .map(str::to_string)
                        .unwrap_or_else(|| status.to_string()),
                    None,
                ),
            };
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
                details,
            });
        }

        let bytes = response.bytes().await?;
        Ok(DownloadedDocument {
            filename: request.suggested_filename(),
            bytes,
        })
    }
}
