use std::collections::HashMap;

use async_trait::async_trait;

use super::{CollectionConfig, SearchResult, VectorStoreError};
use crate::domain::Namespace;

/// Equality conditions over point metadata, ANDed together.
pub type MetadataFilter = HashMap<String, serde_json::Value>;

/// A point as stored: id unique within its namespace, a vector at the
/// collection dimension, and scalar metadata carrying `document_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: HashMap<String, serde_json::Value>,
}

/// One page of a filtered id enumeration. `next_page_token` is `None` once
/// the store has no further pages.
#[derive(Debug, Clone, Default)]
pub struct IdPage {
    pub ids: Vec<String>,
    pub next_page_token: Option<String>,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn create_collection(&self, config: &CollectionConfig) -> Result<bool, VectorStoreError>;

    async fn collection_exists(&self) -> Result<bool, VectorStoreError>;

    /// Vector size of the existing collection, `None` when it is absent.
    async fn collection_dimension(&self) -> Result<Option<u64>, VectorStoreError>;

    /// Insert-or-overwrite by id within the namespace.
    async fn upsert(
        &self,
        namespace: &Namespace,
        points: &[PointRecord],
    ) -> Result<(), VectorStoreError>;

    /// Top-k nearest points in the store's native ranking order.
    async fn query(
        &self,
        namespace: &Namespace,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>, VectorStoreError>;

    /// Enumerate ids matching `filter`, at most `limit` per page.
    async fn list_ids(
        &self,
        namespace: &Namespace,
        filter: &MetadataFilter,
        limit: usize,
        page_token: Option<&str>,
    ) -> Result<IdPage, VectorStoreError>;

    async fn delete_by_ids(
        &self,
        namespace: &Namespace,
        ids: &[String],
    ) -> Result<(), VectorStoreError>;
}
