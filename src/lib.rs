#![deny(missing_docs)]

//! Core library for the Summary Vault backend.

/// HTTP routing and REST handlers.
pub mod api;
/// Chroma vector store integration.
pub mod chroma;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Structured logging and tracing setup.
pub mod logging;
/// Pipeline metrics helpers.
pub mod metrics;
/// Submission pipeline and history sanitization.
pub mod pipeline;
/// Abstractive summarization client abstraction and adapters.
pub mod summarization;
