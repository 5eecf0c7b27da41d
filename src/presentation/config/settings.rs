use serde::Deserialize;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub qdrant: QdrantSettings,
    pub embeddings: EmbeddingsSettings,
    pub chunking: ChunkingSettings,
    pub index: IndexSettings,
    pub retrieval: RetrievalSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QdrantSettings {
    pub url: String,
    pub collection_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsSettings {
    pub api_key: String,
    pub model: String,
    pub dimension: usize,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingSettings {
    pub strategy: ChunkingStrategy,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub boundary_window: usize,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingStrategy {
    Boundary,
    Fixed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexSettings {
    pub default_namespace: String,
    pub delete_page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalSettings {
    pub default_top_k: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub json: bool,
}

impl Settings {
    /// Defaults, then `appsettings.toml` (+ an environment-specific file),
    /// then `APP__`-prefixed environment variables. A handful of well-known
    /// variable names used by existing deployments win last.
    pub fn load() -> Result<Self, config::ConfigError> {
        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".to_string())
            .try_into()
            .map_err(config::ConfigError::Message)?;

        let builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("qdrant.url", "http://localhost:6334")?
            .set_default("qdrant.collection_name", "rag_main")?
            .set_default("embeddings.api_key", "")?
            .set_default("embeddings.model", "text-embedding-3-small")?
            .set_default("embeddings.dimension", 512)?
            .set_default("embeddings.batch_size", 64)?
            .set_default("chunking.strategy", "boundary")?
            .set_default("chunking.chunk_size", 800)?
            .set_default("chunking.chunk_overlap", 0)?
            .set_default("chunking.boundary_window", 200)?
            .set_default("index.default_namespace", "default")?
            .set_default("index.delete_page_size", 128)?
            .set_default("retrieval.default_top_k", 10)?
            .set_default("logging.json", false)?
            .add_source(config::File::with_name("appsettings").required(false))
            .add_source(
                config::File::with_name(&format!("appsettings.{}", environment.as_str()))
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__"),
            );

        let mut settings: Settings = builder.build()?.try_deserialize()?;

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                settings.embeddings.api_key = key;
            }
        }
        if let Ok(url) = std::env::var("QDRANT_URL") {
            settings.qdrant.url = url;
        }
        if let Ok(namespace) = std::env::var("RAG_NAMESPACE") {
            settings.index.default_namespace = namespace;
        }
        if let Ok(dimension) = std::env::var("EMBED_DIM") {
            settings.embeddings.dimension = dimension
                .parse()
                .map_err(|_| config::ConfigError::Message("EMBED_DIM must be an integer".into()))?;
        }

        Ok(settings)
    }
}
