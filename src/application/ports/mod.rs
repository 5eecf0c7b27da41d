mod collection_config;
mod distance_metric;
mod embedder;
mod file_loader;
mod payload_field_type;
mod payload_index;
mod search_result;
mod text_splitter;
mod vector_store;
mod vector_store_error;

pub use collection_config::CollectionConfig;
pub use distance_metric::DistanceMetric;
pub use embedder::{Embedder, EmbedderError};
pub use file_loader::{FileLoader, FileLoaderError};
pub use payload_field_type::PayloadFieldType;
pub use payload_index::PayloadIndex;
pub use search_result::SearchResult;
pub use text_splitter::{TextSplitter, TextSplitterError};
pub use vector_store::{IdPage, MetadataFilter, PointRecord, VectorStore};
pub use vector_store_error::VectorStoreError;
