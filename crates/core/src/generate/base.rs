//! Base Generator trait and supporting types.

use async_trait::async_trait;
use bytes::Bytes;
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

/// A validated generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Model identifier passed to the upstream.
    pub model: String,

    /// The prompt text. Never blank.
    pub prompt: String,
}

impl GenerationRequest {
    /// Build a request from optional client fields.
    ///
    /// A missing or blank model resolves to `default_model`. A missing or
    /// blank prompt is rejected.
    pub fn resolve(
        model: Option<&str>,
        prompt: Option<&str>,
        default_model: &str,
    ) -> Result<Self, GenerateError> {
        let prompt = match prompt {
            Some(prompt) if !prompt.trim().is_empty() => prompt.to_string(),
            _ => return Err(GenerateError::InvalidRequest("prompt required".to_string())),
        };

        let model = match model.map(str::trim) {
            Some(model) if !model.is_empty() => model.to_string(),
            _ => default_model.to_string(),
        };

        Ok(Self { model, prompt })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Upstream returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },
    #[error("Upstream stream interrupted: {0}")]
    UpstreamInterrupted(String),
}

impl GenerateError {
    /// Whether the error means the upstream cannot serve this request at
    /// all, as opposed to a bad request or a broken stream.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            GenerateError::UpstreamUnavailable(_) | GenerateError::UpstreamStatus { .. }
        )
    }
}

/// Flat text output of a generation, delivered incrementally.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<Bytes, GenerateError>> + Send>>;

#[async_trait]
pub trait Generator: Send + Sync {
    async fn check_availability(&self) -> bool;
    async fn generate(&self, request: &GenerationRequest) -> Result<TextStream, GenerateError>;
}
