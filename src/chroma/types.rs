//! Shared types used by the Chroma client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned while interacting with Chroma.
#[derive(Debug, Error)]
pub enum ChromaError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Chroma URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Chroma responded with an unexpected status code.
    #[error("Unexpected Chroma response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from Chroma.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Chroma returned a body that does not match the expected shape.
    #[error("Malformed Chroma response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Deserialize)]
pub(crate) struct CollectionResponse {
    pub(crate) id: String,
    #[allow(dead_code)]
    pub(crate) name: String,
}
