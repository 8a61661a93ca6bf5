//! Ollama-compatible upstream client.
//!
//! Uses two endpoints of the upstream API: `POST /api/generate` with
//! streaming enabled, and `GET /api/tags` for the model list and the
//! availability check.

use crate::generate::base::{GenerateError, GenerationRequest, Generator, TextStream};
use crate::generate::reframer::reframe;
use async_trait::async_trait;
use bf_protocol::config_models::UpstreamConfig;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const ERROR_BODY_LIMIT: usize = 320;

/// Entries are kept loose so one odd record does not sink the listing.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<serde_json::Value>,
}

impl TagsResponse {
    fn names(self) -> Vec<String> {
        self.models
            .into_iter()
            .filter_map(|entry| entry.get("name")?.as_str().map(str::to_string))
            .collect()
    }
}

/// Client for an Ollama-compatible generation service.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl OllamaClient {
    /// Create a client for the service at `base_url`.
    ///
    /// `request_timeout` bounds connection setup and the wait for response
    /// headers on every call, and the whole exchange for the non-streaming
    /// queries. A streaming generation is not bounded once its body starts
    /// flowing.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, GenerateError> {
        let client = Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .map_err(|e| {
                GenerateError::UpstreamUnavailable(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout,
        })
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, GenerateError> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Open a streaming generation and return the raw NDJSON body.
    ///
    /// # Errors
    ///
    /// - `UpstreamUnavailable` if the request cannot be sent or no response
    ///   headers arrive within the request timeout
    /// - `UpstreamStatus` if the upstream answers with a non-2xx status
    pub async fn open_generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<reqwest::Response, GenerateError> {
        let payload = json!({
            "model": request.model,
            "prompt": request.prompt,
            "stream": true,
        });

        let send = self
            .client
            .post(self.url("/api/generate"))
            .json(&payload)
            .send();

        let response = tokio::time::timeout(self.request_timeout, send)
            .await
            .map_err(|_| {
                GenerateError::UpstreamUnavailable(format!(
                    "no response within {}ms",
                    self.request_timeout.as_millis()
                ))
            })?
            .map_err(|e| GenerateError::UpstreamUnavailable(e.to_string()))?;

        ensure_success(response).await
    }

    /// List the model names installed on the upstream.
    pub async fn list_models(&self) -> Result<Vec<String>, GenerateError> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| GenerateError::UpstreamUnavailable(e.to_string()))?;

        let tags: TagsResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| GenerateError::UpstreamUnavailable(format!("invalid tags response: {e}")))?;

        Ok(tags.names())
    }

    /// Check the upstream. `Ok` means it answered `/api/tags` with 2xx.
    pub async fn health(&self) -> Result<(), GenerateError> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| GenerateError::UpstreamUnavailable(e.to_string()))?;

        ensure_success(response).await.map(|_| ())
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GenerateError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(GenerateError::UpstreamStatus {
        status: status.as_u16(),
        body: truncate(&body, ERROR_BODY_LIMIT),
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

#[async_trait]
impl Generator for OllamaClient {
    async fn check_availability(&self) -> bool {
        self.health().await.is_ok()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<TextStream, GenerateError> {
        let response = self.open_generate(request).await?;
        tracing::debug!(model = %request.model, "upstream generation opened");
        Ok(reframe(response.bytes_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OllamaClient {
        OllamaClient::new(&server.uri(), Duration::from_secs(2)).unwrap()
    }

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest::resolve(Some("llama3"), Some(prompt), "llama3").unwrap()
    }

    #[tokio::test]
    async fn test_generate_reframes_ndjson() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({"model": "llama3", "prompt": "hi", "stream": true})))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "{\"response\":\"Hel\"}\n{\"response\":\"lo\"}\n{\"done\":true}\n",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let stream = client_for(&server).generate(&request("hi")).await.unwrap();
        let chunks: Vec<_> = stream.collect().await;
        let text: Vec<u8> = chunks.into_iter().flat_map(|c| c.unwrap().to_vec()).collect();
        assert_eq!(text, b"Hello");
    }

    #[tokio::test]
    async fn test_generate_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model 'x' not found"))
            .mount(&server)
            .await;

        let result = client_for(&server).generate(&request("hi")).await;
        match result {
            Err(GenerateError::UpstreamStatus { status, body }) => {
                assert_eq!(status, 404);
                assert!(body.contains("not found"));
            }
            _ => panic!("Expected UpstreamStatus error"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OllamaClient::new(&format!("http://{addr}"), Duration::from_secs(1)).unwrap();
        let result = client.generate(&request("hi")).await;
        assert!(matches!(result, Err(GenerateError::UpstreamUnavailable(_))));
        assert!(!client.check_availability().await);
    }

    /// Accepts connections and holds them open without answering.
    async fn silent_upstream() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_silent_upstream_times_out() {
        let client = OllamaClient::new(&silent_upstream().await, Duration::from_millis(200)).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), client.generate(&request("hi")))
            .await
            .expect("generate should give up after the request timeout");

        match result {
            Err(GenerateError::UpstreamUnavailable(reason)) => {
                assert!(reason.contains("no response within 200ms"));
            }
            _ => panic!("Expected UpstreamUnavailable error"),
        }
    }

    #[tokio::test]
    async fn test_list_models_skips_entries_without_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "llama3"}, {"name": 5}, {}, "phi3", {"name": "mistral"}]
            })))
            .mount(&server)
            .await;

        assert_eq!(
            client_for(&server).list_models().await.unwrap(),
            vec!["llama3".to_string(), "mistral".to_string()]
        );
    }

    #[tokio::test]
    async fn test_list_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "llama3:latest", "size": 1}, {"name": "mistral"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(
            client.list_models().await.unwrap(),
            vec!["llama3:latest".to_string(), "mistral".to_string()]
        );
        assert!(client.health().await.is_ok());
    }

    #[tokio::test]
    async fn test_health_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let result = client_for(&server).health().await;
        assert!(matches!(
            result,
            Err(GenerateError::UpstreamStatus { status: 500, .. })
        ));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.url("/api/tags"), "http://localhost:11434/api/tags");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
