use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::application::ports::{
    CollectionConfig, IdPage, MetadataFilter, PointRecord, SearchResult, VectorStore,
    VectorStoreError,
};
use crate::domain::{Embedding, Namespace};

struct StoredPoint {
    vector: Vec<f32>,
    metadata: HashMap<String, serde_json::Value>,
}

/// Process-local vector store with real cosine scoring and deterministic
/// paging (points iterate in id order; a page token means "start after this
/// id"). Backs the hermetic tests and offline runs; behavior mirrors the
/// Qdrant adapter's contract.
pub struct InMemoryVectorStore {
    dimensions: u64,
    namespaces: RwLock<HashMap<String, BTreeMap<String, StoredPoint>>>,
}

impl InMemoryVectorStore {
    pub fn new(dimensions: u64) -> Self {
        Self {
            dimensions,
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    fn matches(metadata: &HashMap<String, serde_json::Value>, filter: &MetadataFilter) -> bool {
        filter
            .iter()
            .all(|(key, value)| metadata.get(key) == Some(value))
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, _config: &CollectionConfig) -> Result<bool, VectorStoreError> {
        Ok(false)
    }

    async fn collection_exists(&self) -> Result<bool, VectorStoreError> {
        Ok(true)
    }

    async fn collection_dimension(&self) -> Result<Option<u64>, VectorStoreError> {
        Ok(Some(self.dimensions))
    }

    async fn upsert(
        &self,
        namespace: &Namespace,
        points: &[PointRecord],
    ) -> Result<(), VectorStoreError> {
        let mut namespaces = self
            .namespaces
            .write()
            .map_err(|_| VectorStoreError::UpsertFailed("store lock poisoned".to_string()))?;

        let entries = namespaces.entry(namespace.as_str().to_string()).or_default();
        for point in points {
            entries.insert(
                point.id.clone(),
                StoredPoint {
                    vector: point.vector.clone(),
                    metadata: point.metadata.clone(),
                },
            );
        }

        Ok(())
    }

    async fn query(
        &self,
        namespace: &Namespace,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        let namespaces = self
            .namespaces
            .read()
            .map_err(|_| VectorStoreError::SearchFailed("store lock poisoned".to_string()))?;

        let query = Embedding::new(vector.to_vec());
        let mut results: Vec<SearchResult> = namespaces
            .get(namespace.as_str())
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(_, point)| {
                        filter.is_none_or(|f| Self::matches(&point.metadata, f))
                    })
                    .map(|(id, point)| SearchResult {
                        id: id.clone(),
                        score: query.cosine_similarity(&Embedding::new(point.vector.clone())),
                        metadata: point.metadata.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }

    async fn list_ids(
        &self,
        namespace: &Namespace,
        filter: &MetadataFilter,
        limit: usize,
        page_token: Option<&str>,
    ) -> Result<IdPage, VectorStoreError> {
        let namespaces = self
            .namespaces
            .read()
            .map_err(|_| VectorStoreError::ListFailed("store lock poisoned".to_string()))?;

        let Some(entries) = namespaces.get(namespace.as_str()) else {
            return Ok(IdPage::default());
        };

        let mut ids = Vec::new();
        let mut next_page_token = None;

        for (id, point) in entries {
            if !Self::matches(&point.metadata, filter) {
                continue;
            }
            if page_token.is_some_and(|token| id.as_str() <= token) {
                continue;
            }
            if ids.len() == limit {
                next_page_token = ids.last().cloned();
                break;
            }
            ids.push(id.clone());
        }

        Ok(IdPage {
            ids,
            next_page_token,
        })
    }

    async fn delete_by_ids(
        &self,
        namespace: &Namespace,
        ids: &[String],
    ) -> Result<(), VectorStoreError> {
        let mut namespaces = self
            .namespaces
            .write()
            .map_err(|_| VectorStoreError::DeleteFailed("store lock poisoned".to_string()))?;

        if let Some(entries) = namespaces.get_mut(namespace.as_str()) {
            for id in ids {
                entries.remove(id);
            }
        }

        Ok(())
    }
}
