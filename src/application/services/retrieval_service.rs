use std::sync::Arc;

use crate::application::ports::{
    Embedder, EmbedderError, MetadataFilter, SearchResult, VectorStore, VectorStoreError,
};
use crate::domain::Namespace;

use super::dimension::{ensure_dimension, DimensionMismatch};

/// A similarity query. Exactly one of `text` and `vector` must be set;
/// `top_k` falls back to the configured default when missing or
/// non-positive.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub text: Option<String>,
    pub vector: Option<Vec<f32>>,
    pub top_k: Option<i64>,
    pub filter: Option<MetadataFilter>,
}

pub struct RetrievalService {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    embedding_dimension: usize,
    default_top_k: usize,
}

impl RetrievalService {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        embedding_dimension: usize,
        default_top_k: usize,
    ) -> Self {
        Self {
            embedder,
            vector_store,
            embedding_dimension,
            default_top_k,
        }
    }

    /// Resolve the request to a query vector and run the similarity search.
    /// Results come back in the store's own ranking order; nothing re-ranks
    /// them here. Malformed requests are rejected before any provider or
    /// store call is made.
    #[tracing::instrument(skip(self, request), fields(namespace = %namespace))]
    pub async fn query(
        &self,
        namespace: &Namespace,
        request: QueryRequest,
    ) -> Result<Vec<SearchResult>, RetrievalError> {
        let top_k = match request.top_k {
            Some(k) if k > 0 => k as usize,
            _ => self.default_top_k,
        };

        let vector = match (request.text, request.vector) {
            (Some(_), Some(_)) => {
                return Err(RetrievalError::InvalidQuery(
                    "provide either 'text' or 'vector', not both".to_string(),
                ));
            }
            (None, None) => {
                return Err(RetrievalError::InvalidQuery(
                    "provide 'text' or 'vector'".to_string(),
                ));
            }
            (Some(text), None) => {
                let embedding = self.embedder.embed(&text).await?;
                ensure_dimension(self.embedding_dimension, embedding.dimensions())?;
                embedding.values
            }
            (None, Some(vector)) => {
                ensure_dimension(self.embedding_dimension, vector.len())?;
                vector
            }
        };

        let results = self
            .vector_store
            .query(namespace, &vector, top_k, request.filter.as_ref())
            .await?;

        tracing::debug!(results = results.len(), top_k, "query_complete");
        Ok(results)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("embedding: {0}")]
    Embedding(#[from] EmbedderError),
    #[error(transparent)]
    Dimension(#[from] DimensionMismatch),
    #[error("search: {0}")]
    Search(#[from] VectorStoreError),
}
