//! Generation service with synthetic fallback.
//!
//! The `GenerationService` is responsible for:
//! - Resolving client requests against the default model
//! - Routing to the upstream, or straight to the synthetic generator when
//!   fallback is forced
//! - Substituting the synthetic stream when the upstream is unavailable

use crate::generate::base::{GenerateError, GenerationRequest, Generator, TextStream};
use crate::generate::ollama::OllamaClient;
use crate::generate::synthetic::SyntheticGenerator;
use bf_protocol::config_models::{AppConfig, DEFAULT_MODEL};
use std::sync::Arc;
use std::time::Duration;

/// Routes generation requests to the upstream or the synthetic fallback.
pub struct GenerationService {
    upstream: Arc<dyn Generator>,
    fallback: Arc<dyn Generator>,
    force_fallback: bool,
    default_model: String,
}

impl GenerationService {
    /// Create a service over the given upstream with the default synthetic
    /// fallback.
    pub fn new(upstream: Arc<dyn Generator>) -> Self {
        Self {
            upstream,
            fallback: Arc::new(SyntheticGenerator::default()),
            force_fallback: false,
            default_model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Build the service described by the configuration.
    ///
    /// # Returns
    ///
    /// The service and the upstream client, which callers also use for
    /// the model list and health queries.
    pub fn from_config(config: &AppConfig) -> Result<(Self, Arc<OllamaClient>), GenerateError> {
        let client = Arc::new(OllamaClient::from_config(&config.upstream)?);
        let fallback = SyntheticGenerator::new(Duration::from_millis(
            config.streams.fallback_interval_ms,
        ));

        let service = Self::new(client.clone())
            .with_fallback(Arc::new(fallback))
            .with_forced_fallback(config.upstream.force_fallback)
            .with_default_model(config.upstream.default_model.clone());

        Ok((service, client))
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn Generator>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Always use the fallback, never contacting the upstream.
    pub fn with_forced_fallback(mut self, forced: bool) -> Self {
        self.force_fallback = forced;
        self
    }

    pub fn with_default_model(mut self, model: String) -> Self {
        self.default_model = model;
        self
    }

    pub fn is_fallback_forced(&self) -> bool {
        self.force_fallback
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Validate optional client fields into a request.
    pub fn request(
        &self,
        model: Option<&str>,
        prompt: Option<&str>,
    ) -> Result<GenerationRequest, GenerateError> {
        GenerationRequest::resolve(model, prompt, &self.default_model)
    }

    /// Start a generation.
    ///
    /// # Arguments
    ///
    /// * `request` - A validated request
    ///
    /// # Returns
    ///
    /// A text stream from the upstream, or from the synthetic generator if
    /// fallback is forced or the upstream cannot serve the request.
    ///
    /// # Behavior
    ///
    /// 1. If fallback is forced, use the fallback without contacting the upstream
    /// 2. Otherwise open the upstream stream
    /// 3. If that fails with an availability error, use the fallback
    /// 4. Any other error is returned
    pub async fn generate(&self, request: &GenerationRequest) -> Result<TextStream, GenerateError> {
        if self.force_fallback {
            tracing::debug!(model = %request.model, "serving forced synthetic fallback");
            return self.fallback.generate(request).await;
        }

        match self.upstream.generate(request).await {
            Ok(stream) => Ok(stream),
            Err(e) if e.is_unavailable() => {
                tracing::warn!(
                    model = %request.model,
                    error = %e,
                    "upstream unavailable, serving synthetic fallback"
                );
                self.fallback.generate(request).await
            }
            Err(e) => Err(e),
        }
    }
}
