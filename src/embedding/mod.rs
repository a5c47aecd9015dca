//! Embedding client abstraction and the Ollama-backed adapter.
//!
//! Mirrors the summarization adapter: one HTTP request per submission, output normalized
//! to a plain `Vec<f32>` so the persistence layer and the wire format never see a
//! provider-specific numeric type.

use crate::config::get_config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider was unreachable.
    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider was unable to produce an embedding for the supplied input.
    #[error("Failed to generate embedding: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
    /// Returned vector does not match the configured dimensionality.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected embedding dimension configured on the server.
        expected: usize,
        /// Actual embedding dimension produced by the provider.
        actual: usize,
    },
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce a fixed-dimensionality embedding vector for the supplied text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingClientError>;
}

/// Build an embedding client from the loaded configuration.
pub fn get_embedding_client() -> Box<dyn EmbeddingClient> {
    let config = get_config();
    let base_url = config
        .ollama_url
        .clone()
        .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
    Box::new(OllamaEmbeddingClient::new(
        base_url,
        config.embedding_model.clone(),
        config.embedding_dimension,
    ))
}

struct OllamaEmbeddingClient {
    http: Client,
    base_url: String,
    model: String,
    dimension: usize,
}

impl OllamaEmbeddingClient {
    fn new(base_url: String, model: String, dimension: usize) -> Self {
        let http = Client::builder()
            .user_agent("summary-vault/embed")
            .build()
            .expect("Failed to construct reqwest::Client for embeddings");
        Self {
            http,
            base_url,
            model,
            dimension,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/embeddings", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingClientError> {
        tracing::debug!(model = %self.model, dimension = self.dimension, "Generating embedding");

        let payload = json!({
            "model": self.model,
            "prompt": text,
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                EmbeddingClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(EmbeddingClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaEmbeddingResponse = response.json().await.map_err(|error| {
            EmbeddingClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if body.embedding.len() != self.dimension {
            return Err(EmbeddingClientError::DimensionMismatch {
                expected: self.dimension,
                actual: body.embedding.len(),
            });
        }

        Ok(body.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn test_client(base_url: String, dimension: usize) -> OllamaEmbeddingClient {
        OllamaEmbeddingClient {
            http: Client::builder()
                .user_agent("summary-vault-test")
                .build()
                .expect("client"),
            base_url,
            model: "minilm".into(),
            dimension,
        }
    }

    #[tokio::test]
    async fn ollama_client_returns_plain_vector() {
        let server = MockServer::start_async().await;
        let client = test_client(server.base_url(), 4);

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/embeddings")
                    .json_body_partial(r#"{"model": "minilm", "prompt": "Example text"}"#);
                then.status(200).json_body(json!({
                    "embedding": [0.1, 0.2, 0.3, 0.4]
                }));
            })
            .await;

        let vector = client.embed("Example text").await.expect("embedding");

        mock.assert();
        assert_eq!(vector, vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[tokio::test]
    async fn ollama_client_rejects_wrong_dimension() {
        let server = MockServer::start_async().await;
        let client = test_client(server.base_url(), 8);

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embeddings");
                then.status(200).json_body(json!({
                    "embedding": [0.1, 0.2]
                }));
            })
            .await;

        let error = client.embed("Example text").await.expect_err("mismatch");

        assert!(matches!(
            error,
            EmbeddingClientError::DimensionMismatch {
                expected: 8,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn ollama_client_handles_error_status() {
        let server = MockServer::start_async().await;
        let client = test_client(server.base_url(), 4);

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embeddings");
                then.status(500).body("boom");
            })
            .await;

        let error = client.embed("Example text").await.expect_err("error");

        assert!(
            matches!(error, EmbeddingClientError::GenerationFailed(ref message) if message.contains("500"))
        );
    }
}
