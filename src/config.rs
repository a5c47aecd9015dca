use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Summary Vault backend.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the Chroma instance that stores submissions.
    pub chroma_url: String,
    /// Name of the Chroma collection holding summary records.
    pub chroma_collection_name: String,
    /// Optional token required to access Chroma.
    pub chroma_api_key: Option<String>,
    /// Optional base URL of the Ollama runtime serving both models.
    pub ollama_url: Option<String>,
    /// Model identifier used for abstractive summarization.
    pub summarization_model: String,
    /// Model identifier used to generate embedding vectors.
    pub embedding_model: String,
    /// Dimensionality of the produced vectors.
    pub embedding_dimension: usize,
    /// Number of records fetched by the history peek.
    pub history_peek_limit: usize,
    /// Optional upper bound on submission length, in characters.
    pub max_input_chars: Option<usize>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Collection name used when `CHROMA_COLLECTION_NAME` is not set.
pub const DEFAULT_COLLECTION_NAME: &str = "summary_history";

const DEFAULT_HISTORY_PEEK_LIMIT: usize = 10;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            chroma_url: load_env("CHROMA_URL")?,
            chroma_collection_name: load_env_optional("CHROMA_COLLECTION_NAME")
                .unwrap_or_else(|| DEFAULT_COLLECTION_NAME.to_string()),
            chroma_api_key: load_env_optional("CHROMA_API_KEY"),
            ollama_url: load_env_optional("OLLAMA_URL"),
            summarization_model: load_env("SUMMARIZATION_MODEL")?,
            embedding_model: load_env("EMBEDDING_MODEL")?,
            embedding_dimension: load_env("EMBEDDING_DIMENSION")?
                .parse()
                .map_err(|_| ConfigError::InvalidValue("EMBEDDING_DIMENSION".to_string()))?,
            history_peek_limit: load_env_optional("HISTORY_PEEK_LIMIT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("HISTORY_PEEK_LIMIT".to_string()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_HISTORY_PEEK_LIMIT),
            max_input_chars: load_env_optional("MAX_INPUT_CHARS")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("MAX_INPUT_CHARS".to_string()))
                })
                .transpose()?,
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        chroma_url = %config.chroma_url,
        collection = %config.chroma_collection_name,
        server_port = ?config.server_port,
        summarization_model = %config.summarization_model,
        embedding_model = %config.embedding_model,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
