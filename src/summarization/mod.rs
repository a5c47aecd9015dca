//! Abstractive summarization adapter.
//!
//! The pipeline treats the summarizer as an opaque capability: given text, return one
//! summary string. The Ollama-backed client issues a single non-streaming generation
//! request with fixed decoding parameters; there is no retry, so cost and latency of a
//! failed inference stay visible to the caller.

use crate::config::get_config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Maximum number of tokens requested from the summarization model.
pub const SUMMARY_MAX_TOKENS: usize = 130;
/// Minimum summary length requested from the summarization model.
pub const SUMMARY_MIN_TOKENS: usize = 30;

/// Errors surfaced while attempting abstractive summarization.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider was unreachable.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by abstractive summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Generate the single best summary for the supplied text.
    async fn summarize(&self, text: &str) -> Result<String, SummarizationClientError>;
}

/// Build a summarization client from the loaded configuration.
pub fn get_summarization_client() -> Box<dyn SummarizationClient> {
    let config = get_config();
    let base_url = config
        .ollama_url
        .clone()
        .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
    Box::new(OllamaSummarizationClient::new(
        base_url,
        config.summarization_model.clone(),
    ))
}

struct OllamaSummarizationClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaSummarizationClient {
    fn new(base_url: String, model: String) -> Self {
        let http = Client::builder()
            .user_agent("summary-vault/summarize")
            .build()
            .expect("Failed to construct reqwest::Client for summarization");
        Self {
            http,
            base_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    fn build_prompt(text: &str) -> String {
        format!(
            "Summarize the following text in roughly {SUMMARY_MIN_TOKENS} to {SUMMARY_MAX_TOKENS} tokens. \
             Respond with the summary only.\n\n{text}"
        )
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl SummarizationClient for OllamaSummarizationClient {
    async fn summarize(&self, text: &str) -> Result<String, SummarizationClientError> {
        let payload = json!({
            "model": self.model,
            "prompt": Self::build_prompt(text),
            "stream": false,
            "options": {
                // Deterministic decoding; the token cap bounds the summary length.
                "temperature": 0.0,
                "num_predict": SUMMARY_MAX_TOKENS,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SummarizationClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(SummarizationClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}
