//! HTTP client wrapper for interacting with Chroma.

use crate::chroma::{
    payload::{build_metadata, current_timestamp_rfc3339, generate_record_id},
    types::{ChromaError, CollectionResponse},
};
use crate::config::get_config;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Map, Value, json};

/// Write/read surface the pipeline expects from the vector store.
///
/// `add_record` assigns the identifier itself so a successful call always names exactly
/// one new record; `count` and `peek` back the history path.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Persist one record and return its freshly assigned identifier.
    async fn add_record(
        &self,
        document: &str,
        summary: &str,
        embedding: Vec<f32>,
    ) -> Result<String, ChromaError>;

    /// Total number of records currently stored in the collection.
    async fn count(&self) -> Result<usize, ChromaError>;

    /// Fetch up to `limit` records in store order, embeddings included.
    async fn peek(&self, limit: usize) -> Result<Map<String, Value>, ChromaError>;
}

/// Lightweight HTTP client for Chroma operations.
pub struct ChromaStore {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
    pub(crate) collection_id: String,
}

impl ChromaStore {
    /// Connect using configuration derived from the environment, resolving the target
    /// collection via `get_or_create` so the store is usable for the process lifetime.
    pub async fn connect() -> Result<Self, ChromaError> {
        let config = get_config();
        let client = Client::builder().user_agent("summary-vault/0.1").build()?;
        let base_url = normalize_base_url(&config.chroma_url).map_err(ChromaError::InvalidUrl)?;

        let mut store = Self {
            client,
            base_url,
            api_key: config.chroma_api_key.clone(),
            collection_id: String::new(),
        };
        store.collection_id = store
            .get_or_create_collection(&config.chroma_collection_name)
            .await?;

        tracing::debug!(
            url = %store.base_url,
            collection = %config.chroma_collection_name,
            collection_id = %store.collection_id,
            "Initialized Chroma HTTP client"
        );

        Ok(store)
    }

    async fn get_or_create_collection(&self, name: &str) -> Result<String, ChromaError> {
        let body = json!({
            "name": name,
            "get_or_create": true,
        });

        let response = self
            .request(Method::POST, "api/v1/collections")?
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = ChromaError::UnexpectedStatus { status, body };
            tracing::error!(collection = name, error = %error, "Failed to resolve collection");
            return Err(error);
        }

        let collection: CollectionResponse = response.json().await?;
        Ok(collection.id)
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ChromaError> {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            req = req.header("X-Chroma-Token", api_key);
        }
        Ok(req)
    }

    async fn ensure_success<F>(
        &self,
        response: reqwest::Response,
        on_success: F,
    ) -> Result<(), ChromaError>
    where
        F: FnOnce(),
    {
        if response.status().is_success() {
            on_success();
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = ChromaError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Chroma request failed");
            Err(error)
        }
    }
}

#[async_trait]
impl VectorStore for ChromaStore {
    async fn add_record(
        &self,
        document: &str,
        summary: &str,
        embedding: Vec<f32>,
    ) -> Result<String, ChromaError> {
        let record_id = generate_record_id();
        let now = current_timestamp_rfc3339();
        let body = json!({
            "ids": [record_id],
            "embeddings": [embedding],
            "documents": [document],
            "metadatas": [build_metadata(summary, &now)],
        });

        let response = self
            .request(
                Method::POST,
                &format!("api/v1/collections/{}/add", self.collection_id),
            )?
            .json(&body)
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::debug!(record_id = %record_id, "Record stored");
        })
        .await?;

        Ok(record_id)
    }

    async fn count(&self) -> Result<usize, ChromaError> {
        let response = self
            .request(
                Method::GET,
                &format!("api/v1/collections/{}/count", self.collection_id),
            )?
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = ChromaError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Failed to count records");
            return Err(error);
        }

        response.json::<usize>().await.map_err(ChromaError::from)
    }

    async fn peek(&self, limit: usize) -> Result<Map<String, Value>, ChromaError> {
        let body = json!({
            "limit": limit,
            "include": ["embeddings", "documents", "metadatas"],
        });

        let response = self
            .request(
                Method::POST,
                &format!("api/v1/collections/{}/get", self.collection_id),
            )?
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = ChromaError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Failed to peek records");
            return Err(error);
        }

        match response.json::<Value>().await? {
            Value::Object(records) => Ok(records),
            other => Err(ChromaError::InvalidResponse(format!(
                "expected a record set object, got {other}"
            ))),
        }
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
