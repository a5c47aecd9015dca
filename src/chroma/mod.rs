//! Chroma vector store integration.

pub mod client;
pub mod payload;
pub mod types;

pub use client::{ChromaStore, VectorStore};
pub use types::ChromaError;
