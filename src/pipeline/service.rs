//! Pipeline service coordinating validation, summarization, embedding, and persistence.

use crate::{
    chroma::{ChromaStore, VectorStore},
    config::get_config,
    embedding::{EmbeddingClient, get_embedding_client},
    metrics::{MetricsSnapshot, ServiceMetrics},
    pipeline::{
        sanitize::strip_embeddings,
        types::{PipelineError, SubmissionOutcome},
    },
    summarization::{SummarizationClient, get_summarization_client},
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Coordinates the full submission pipeline: validation, summarization, embedding, and
/// the vector store write, plus the sanitized history read path.
///
/// The service owns long-lived handles to its collaborators so every request reuses the
/// same clients. Construct it once near process start and share it through an `Arc`.
pub struct SummaryService {
    summarizer: Box<dyn SummarizationClient>,
    embedder: Box<dyn EmbeddingClient>,
    store: Box<dyn VectorStore>,
    history_peek_limit: usize,
    max_input_chars: Option<usize>,
    metrics: Arc<ServiceMetrics>,
}

/// Abstraction over the pipeline used by the HTTP surface.
#[async_trait]
pub trait SummaryApi: Send + Sync {
    /// Validate, summarize, embed, and persist one submission.
    async fn submit(&self, text: String) -> Result<SubmissionOutcome, PipelineError>;

    /// Return recent records with embedding payloads stripped.
    async fn history(&self) -> Result<Value, PipelineError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl SummaryService {
    /// Build a new pipeline service from configuration, failing startup if the vector
    /// store collection cannot be resolved.
    pub async fn new() -> Self {
        let config = get_config();
        tracing::info!("Initializing summarization and embedding clients");
        let summarizer = get_summarization_client();
        let embedder = get_embedding_client();
        let store = ChromaStore::connect()
            .await
            .expect("Failed to connect to Chroma");
        tracing::debug!(collection = %config.chroma_collection_name, "Vector store ready");

        Self::with_collaborators(
            summarizer,
            embedder,
            Box::new(store),
            config.history_peek_limit,
            config.max_input_chars,
        )
    }

    /// Assemble a service from explicit collaborator handles.
    pub fn with_collaborators(
        summarizer: Box<dyn SummarizationClient>,
        embedder: Box<dyn EmbeddingClient>,
        store: Box<dyn VectorStore>,
        history_peek_limit: usize,
        max_input_chars: Option<usize>,
    ) -> Self {
        Self {
            summarizer,
            embedder,
            store,
            history_peek_limit,
            max_input_chars,
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }

    /// Run one submission through the pipeline and return the stored outcome.
    pub async fn submit(&self, text: String) -> Result<SubmissionOutcome, PipelineError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PipelineError::InvalidInput("Text cannot be empty".into()));
        }
        if let Some(limit) = self.max_input_chars
            && text.chars().count() > limit
        {
            return Err(PipelineError::InvalidInput(format!(
                "Text exceeds the maximum length of {limit} characters"
            )));
        }

        let summary = self.summarizer.summarize(text).await?;
        let embedding = self.embedder.embed(text).await?;
        let id = self.store.add_record(text, &summary, embedding).await?;

        self.metrics.record_submission();
        tracing::info!(id = %id, "Submission stored");

        Ok(SubmissionOutcome { id, summary })
    }

    /// Return up to the configured number of stored records, embeddings stripped.
    ///
    /// An empty store short-circuits to an empty list without issuing a peek. Ordering
    /// follows the store's peek semantics, which are not guaranteed to reflect recency.
    pub async fn history(&self) -> Result<Value, PipelineError> {
        let count = self.store.count().await?;
        if count == 0 {
            self.metrics.record_history_request();
            return Ok(Value::Array(Vec::new()));
        }

        let records = self.store.peek(self.history_peek_limit).await?;
        let mut view = Value::Object(records);
        strip_embeddings(&mut view);

        self.metrics.record_history_request();
        tracing::debug!(count, "History served");
        Ok(view)
    }

    /// Return the current pipeline metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl SummaryApi for SummaryService {
    async fn submit(&self, text: String) -> Result<SubmissionOutcome, PipelineError> {
        SummaryService::submit(self, text).await
    }

    async fn history(&self) -> Result<Value, PipelineError> {
        SummaryService::history(self).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        SummaryService::metrics_snapshot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chroma::ChromaError;
    use crate::embedding::EmbeddingClientError;
    use crate::summarization::SummarizationClientError;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct FixedSummarizer {
        summary: &'static str,
    }

    impl FixedSummarizer {
        fn new(summary: &'static str) -> Self {
            Self { summary }
        }
    }

    #[async_trait]
    impl SummarizationClient for FixedSummarizer {
        async fn summarize(&self, _text: &str) -> Result<String, SummarizationClientError> {
            Ok(self.summary.to_string())
        }
    }

    struct FailingSummarizer;

    #[async_trait]
    impl SummarizationClient for FailingSummarizer {
        async fn summarize(&self, _text: &str) -> Result<String, SummarizationClientError> {
            Err(SummarizationClientError::GenerationFailed(
                "model out of memory".into(),
            ))
        }
    }

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingClient for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingClientError> {
            Ok(vec![0.1, 0.2, 0.3, 0.4])
        }
    }

    #[derive(Clone, Debug)]
    struct StoredRecord {
        id: String,
        document: String,
        summary: String,
        embedding: Vec<f32>,
    }

    #[derive(Default)]
    struct InMemoryStore {
        records: Mutex<Vec<StoredRecord>>,
        peek_calls: AtomicUsize,
        fail_writes: bool,
    }

    impl InMemoryStore {
        fn records(&self) -> Vec<StoredRecord> {
            self.records.lock().expect("records lock").clone()
        }
    }

    #[async_trait]
    impl VectorStore for InMemoryStore {
        async fn add_record(
            &self,
            document: &str,
            summary: &str,
            embedding: Vec<f32>,
        ) -> Result<String, ChromaError> {
            if self.fail_writes {
                return Err(ChromaError::UnexpectedStatus {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "write rejected".into(),
                });
            }
            let id = Uuid::new_v4().to_string();
            self.records.lock().expect("records lock").push(StoredRecord {
                id: id.clone(),
                document: document.to_string(),
                summary: summary.to_string(),
                embedding,
            });
            Ok(id)
        }

        async fn count(&self) -> Result<usize, ChromaError> {
            Ok(self.records.lock().expect("records lock").len())
        }

        async fn peek(
            &self,
            limit: usize,
        ) -> Result<serde_json::Map<String, Value>, ChromaError> {
            self.peek_calls.fetch_add(1, Ordering::SeqCst);
            let records = self.records.lock().expect("records lock");
            let sample = records.iter().take(limit);

            let mut set = serde_json::Map::new();
            set.insert(
                "ids".into(),
                json!(sample.clone().map(|r| r.id.clone()).collect::<Vec<_>>()),
            );
            set.insert(
                "documents".into(),
                json!(sample.clone().map(|r| r.document.clone()).collect::<Vec<_>>()),
            );
            set.insert(
                "metadatas".into(),
                json!(
                    sample
                        .clone()
                        .map(|r| json!({ "summary": r.summary }))
                        .collect::<Vec<_>>()
                ),
            );
            set.insert(
                "embeddings".into(),
                json!(sample.map(|r| r.embedding.clone()).collect::<Vec<_>>()),
            );
            Ok(set)
        }
    }

    fn service_with(store: Arc<InMemoryStore>) -> SummaryService {
        SummaryService::with_collaborators(
            Box::new(FixedSummarizer::new("A short summary.")),
            Box::new(FixedEmbedder),
            Box::new(SharedStore(store)),
            10,
            None,
        )
    }

    // Arc wrapper so a test can keep inspecting the store after handing it to the service.
    struct SharedStore(Arc<InMemoryStore>);

    #[async_trait]
    impl VectorStore for SharedStore {
        async fn add_record(
            &self,
            document: &str,
            summary: &str,
            embedding: Vec<f32>,
        ) -> Result<String, ChromaError> {
            self.0.add_record(document, summary, embedding).await
        }

        async fn count(&self) -> Result<usize, ChromaError> {
            self.0.count().await
        }

        async fn peek(
            &self,
            limit: usize,
        ) -> Result<serde_json::Map<String, Value>, ChromaError> {
            self.0.peek(limit).await
        }
    }

    #[tokio::test]
    async fn whitespace_submission_is_rejected_without_side_effects() {
        let store = Arc::new(InMemoryStore::default());
        let service = service_with(store.clone());

        let error = service.submit("   ".into()).await.expect_err("rejected");

        assert!(matches!(error, PipelineError::InvalidInput(ref msg) if msg.contains("empty")));
        assert!(error.is_client_fault());
        assert!(store.records().is_empty());
        assert_eq!(service.metrics_snapshot().submissions_stored, 0);
    }

    #[tokio::test]
    async fn validation_runs_before_any_collaborator() {
        // A summarizer that always fails would surface as a Summarization error if it
        // were consulted; whitespace input must short-circuit ahead of it.
        let store = Arc::new(InMemoryStore::default());
        let service = SummaryService::with_collaborators(
            Box::new(FailingSummarizer),
            Box::new(FixedEmbedder),
            Box::new(SharedStore(store.clone())),
            10,
            None,
        );

        let error = service.submit("\t\n".into()).await.expect_err("rejected");

        assert!(matches!(error, PipelineError::InvalidInput(_)));
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn oversized_submission_is_rejected_when_limit_configured() {
        let store = Arc::new(InMemoryStore::default());
        let service = SummaryService::with_collaborators(
            Box::new(FixedSummarizer::new("summary")),
            Box::new(FixedEmbedder),
            Box::new(SharedStore(store.clone())),
            10,
            Some(16),
        );

        let error = service
            .submit("a paragraph well beyond sixteen characters".into())
            .await
            .expect_err("rejected");

        assert!(matches!(error, PipelineError::InvalidInput(ref msg) if msg.contains("16")));
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn successful_submission_persists_one_record() {
        let store = Arc::new(InMemoryStore::default());
        let service = service_with(store.clone());

        let outcome = service
            .submit("  The quick brown fox jumps over the lazy dog.  ".into())
            .await
            .expect("outcome");

        assert_eq!(outcome.summary, "A short summary.");
        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, outcome.id);
        // the trimmed text is what gets persisted
        assert_eq!(
            records[0].document,
            "The quick brown fox jumps over the lazy dog."
        );
        assert_eq!(records[0].summary, "A short summary.");
        assert_eq!(records[0].embedding, vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(service.metrics_snapshot().submissions_stored, 1);
    }

    #[tokio::test]
    async fn repeated_submissions_receive_distinct_ids() {
        let store = Arc::new(InMemoryStore::default());
        let service = service_with(store.clone());

        let mut ids = Vec::new();
        for _ in 0..5 {
            let outcome = service.submit("Some document text.".into()).await.expect("outcome");
            ids.push(outcome.id);
        }

        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
    }

    #[tokio::test]
    async fn summarizer_failure_maps_to_summarization_error() {
        let store = Arc::new(InMemoryStore::default());
        let service = SummaryService::with_collaborators(
            Box::new(FailingSummarizer),
            Box::new(FixedEmbedder),
            Box::new(SharedStore(store.clone())),
            10,
            None,
        );

        let error = service.submit("Some text.".into()).await.expect_err("error");

        assert!(matches!(error, PipelineError::Summarization(_)));
        assert!(error.to_string().contains("model out of memory"));
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn store_failure_maps_to_persistence_error() {
        let store = Arc::new(InMemoryStore {
            fail_writes: true,
            ..Default::default()
        });
        let service = service_with(store.clone());

        let error = service.submit("Some text.".into()).await.expect_err("error");

        assert!(matches!(error, PipelineError::Persistence(_)));
        assert!(error.to_string().contains("write rejected"));
    }

    #[tokio::test]
    async fn empty_store_short_circuits_without_peeking() {
        let store = Arc::new(InMemoryStore::default());
        let service = service_with(store.clone());

        let history = service.history().await.expect("history");

        assert_eq!(history, json!([]));
        assert_eq!(store.peek_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn history_strips_embeddings_from_record_set() {
        let store = Arc::new(InMemoryStore::default());
        let service = service_with(store.clone());

        for _ in 0..3 {
            service.submit("Some document text.".into()).await.expect("outcome");
        }

        let history = service.history().await.expect("history");
        let records = history.as_object().expect("record set object");

        assert!(records.get("embeddings").is_none());
        assert_eq!(records["ids"].as_array().map(Vec::len), Some(3));
        assert_eq!(records["metadatas"][0]["summary"], "A short summary.");
        assert_eq!(store.peek_calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.metrics_snapshot().history_requests, 1);
    }
}
