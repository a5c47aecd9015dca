//! Submission pipeline: validation, summarization, embedding, persistence, and the
//! sanitized history read path.

pub mod sanitize;
mod service;
pub mod types;

pub use service::{SummaryApi, SummaryService};
pub use types::{PipelineError, SubmissionOutcome};
