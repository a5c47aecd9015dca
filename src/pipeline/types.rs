//! Core data types and error definitions for the submission pipeline.

use crate::chroma::ChromaError;
use crate::embedding::EmbeddingClientError;
use crate::summarization::SummarizationClientError;
use thiserror::Error;

/// Errors emitted by the submission pipeline.
///
/// `InvalidInput` is the only caller fault; it is raised before any collaborator is
/// invoked, so a rejected submission leaves no side effects anywhere. The remaining
/// variants wrap the originating collaborator's error with its message intact.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller supplied text that fails validation.
    #[error("{0}")]
    InvalidInput(String),
    /// Summarization provider failed to produce a summary.
    #[error("Summarization failed: {0}")]
    Summarization(#[from] SummarizationClientError),
    /// Embedding provider failed to produce a vector.
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Vector store rejected or failed the requested operation.
    #[error("Vector store request failed: {0}")]
    Persistence(#[from] ChromaError),
}

impl PipelineError {
    /// Whether the fault lies with the caller rather than a collaborator.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Result of a submission that made it through the full pipeline.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    /// Identifier assigned to the stored record.
    pub id: String,
    /// Summary derived from the submitted text.
    pub summary: String,
}
