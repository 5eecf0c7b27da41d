mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    ChunkingSettings, ChunkingStrategy, EmbeddingsSettings, IndexSettings, LoggingSettings,
    QdrantSettings, RetrievalSettings, ServerSettings, Settings,
};
