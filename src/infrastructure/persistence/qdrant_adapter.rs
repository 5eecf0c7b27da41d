use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    point_id::PointIdOptions, value::Kind, vectors_config, Condition, CreateCollectionBuilder,
    CreateFieldIndexCollectionBuilder, DeletePointsBuilder, Distance, FieldType, Filter, PointId,
    PointStruct, PointsIdsList, ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder, VectorsConfig,
};
use qdrant_client::{Payload, Qdrant};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::ports::{
    CollectionConfig, DistanceMetric, IdPage, MetadataFilter, PayloadFieldType, PointRecord,
    SearchResult, VectorStore, VectorStoreError,
};
use crate::domain::Namespace;

/// Qdrant-backed vector store. One collection holds every namespace:
/// points carry a `namespace` payload field that every query, listing and
/// filter includes, and point ids are UUIDv5 digests of namespace + chunk
/// id, so ids from different namespaces cannot collide and re-upserting a
/// chunk id overwrites in place.
pub struct QdrantAdapter {
    client: Arc<Qdrant>,
    collection_name: String,
}

impl QdrantAdapter {
    pub async fn new(url: &str, collection_name: String) -> Result<Self, VectorStoreError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| VectorStoreError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            collection_name,
        })
    }

    pub fn with_client(client: Arc<Qdrant>, collection_name: String) -> Self {
        Self {
            client,
            collection_name,
        }
    }

    fn map_distance_metric(metric: &DistanceMetric) -> Distance {
        match metric {
            DistanceMetric::Cosine => Distance::Cosine,
            DistanceMetric::Euclidean => Distance::Euclid,
            DistanceMetric::DotProduct => Distance::Dot,
        }
    }

    fn map_field_type(field_type: &PayloadFieldType) -> FieldType {
        match field_type {
            PayloadFieldType::Keyword => FieldType::Keyword,
            PayloadFieldType::Integer => FieldType::Integer,
            PayloadFieldType::Float => FieldType::Float,
            PayloadFieldType::Text => FieldType::Text,
        }
    }

    fn point_uuid(namespace: &Namespace, chunk_id: &str) -> String {
        let key = format!("{}/{}", namespace.as_str(), chunk_id);
        Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string()
    }

    /// Namespace condition plus one equality condition per filter entry.
    fn scoped_filter(
        namespace: &Namespace,
        filter: Option<&MetadataFilter>,
    ) -> Result<Filter, VectorStoreError> {
        let mut conditions = vec![Condition::matches(
            "namespace",
            namespace.as_str().to_string(),
        )];

        if let Some(filter) = filter {
            for (key, value) in filter {
                let condition = match value {
                    serde_json::Value::String(s) => Condition::matches(key.as_str(), s.clone()),
                    serde_json::Value::Bool(b) => Condition::matches(key.as_str(), *b),
                    serde_json::Value::Number(n) => match n.as_i64() {
                        Some(i) => Condition::matches(key.as_str(), i),
                        None => return Err(VectorStoreError::InvalidFilter(key.clone())),
                    },
                    _ => return Err(VectorStoreError::InvalidFilter(key.clone())),
                };
                conditions.push(condition);
            }
        }

        Ok(Filter::must(conditions))
    }

    fn point_id_string(point_id: Option<PointId>) -> String {
        match point_id.and_then(|p| p.point_id_options) {
            Some(PointIdOptions::Uuid(uuid)) => uuid,
            Some(PointIdOptions::Num(num)) => num.to_string(),
            None => String::new(),
        }
    }
}

fn json_value(value: QdrantValue) -> serde_json::Value {
    match value.kind {
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::IntegerValue(i)) => serde_json::Value::from(i),
        Some(Kind::DoubleValue(d)) => serde_json::Value::from(d),
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.into_iter().map(json_value).collect())
        }
        Some(Kind::StructValue(fields)) => serde_json::Value::Object(
            fields
                .fields
                .into_iter()
                .map(|(k, v)| (k, json_value(v)))
                .collect(),
        ),
        Some(Kind::NullValue(_)) | None => serde_json::Value::Null,
    }
}

#[async_trait]
impl VectorStore for QdrantAdapter {
    #[instrument(skip(self, config), fields(collection = %self.collection_name))]
    async fn create_collection(&self, config: &CollectionConfig) -> Result<bool, VectorStoreError> {
        if self.collection_exists().await? {
            info!(collection = %self.collection_name, "collection already exists");
            return Ok(false);
        }

        let vectors_config = VectorsConfig::from(VectorParamsBuilder::new(
            config.vector_dimensions,
            Self::map_distance_metric(&config.distance_metric),
        ));

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection_name).vectors_config(vectors_config),
            )
            .await
            .map_err(|e| VectorStoreError::CollectionCreationFailed(e.to_string()))?;

        info!(collection = %self.collection_name, "collection_created");

        for index in &config.payload_indexes {
            self.client
                .create_field_index(CreateFieldIndexCollectionBuilder::new(
                    &self.collection_name,
                    &index.field_name,
                    Self::map_field_type(&index.field_type),
                ))
                .await
                .map_err(|e| VectorStoreError::PayloadIndexFailed(e.to_string()))?;

            info!(
                collection = %self.collection_name,
                field = %index.field_name,
                "payload_index_applied"
            );
        }

        Ok(true)
    }

    #[instrument(skip(self), fields(collection = %self.collection_name))]
    async fn collection_exists(&self) -> Result<bool, VectorStoreError> {
        self.client
            .collection_exists(&self.collection_name)
            .await
            .map_err(|e| VectorStoreError::ConnectionFailed(e.to_string()))
    }

    #[instrument(skip(self), fields(collection = %self.collection_name))]
    async fn collection_dimension(&self) -> Result<Option<u64>, VectorStoreError> {
        if !self.collection_exists().await? {
            return Ok(None);
        }

        let collection_info = self
            .client
            .collection_info(&self.collection_name)
            .await
            .map_err(|e| VectorStoreError::ConnectionFailed(e.to_string()))?;

        let vector_size = collection_info
            .result
            .and_then(|result| result.config)
            .and_then(|config| config.params)
            .and_then(|params| params.vectors_config)
            .and_then(|config| match config.config {
                Some(vectors_config::Config::Params(params)) => Some(params.size),
                _ => None,
            });

        Ok(vector_size)
    }

    #[instrument(skip(self, points), fields(collection = %self.collection_name, namespace = %namespace, count = points.len()))]
    async fn upsert(
        &self,
        namespace: &Namespace,
        points: &[PointRecord],
    ) -> Result<(), VectorStoreError> {
        let points: Vec<PointStruct> = points
            .iter()
            .map(|record| {
                let mut payload = Payload::new();
                payload.insert("namespace", namespace.as_str());
                payload.insert("chunk_id", record.id.as_str());
                for (key, value) in &record.metadata {
                    payload.insert(key.as_str(), value.clone());
                }

                PointStruct::new(
                    Self::point_uuid(namespace, &record.id),
                    record.vector.clone(),
                    payload,
                )
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection_name, points).wait(true))
            .await
            .map_err(|e| VectorStoreError::UpsertFailed(e.to_string()))?;

        info!(namespace = %namespace, "points_upserted");
        Ok(())
    }

    #[instrument(skip(self, vector, filter), fields(collection = %self.collection_name, namespace = %namespace, top_k = top_k))]
    async fn query(
        &self,
        namespace: &Namespace,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        let scoped = Self::scoped_filter(namespace, filter)?;

        let search_result = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection_name, vector.to_vec(), top_k as u64)
                    .filter(scoped)
                    .with_payload(true),
            )
            .await
            .map_err(|e| VectorStoreError::SearchFailed(e.to_string()))?;

        let results = search_result
            .result
            .into_iter()
            .map(|point| {
                let mut metadata: HashMap<String, serde_json::Value> = HashMap::new();
                let mut chunk_id = None;

                for (key, value) in point.payload {
                    match key.as_str() {
                        "namespace" => {}
                        "chunk_id" => {
                            if let serde_json::Value::String(s) = json_value(value) {
                                chunk_id = Some(s);
                            }
                        }
                        _ => {
                            metadata.insert(key, json_value(value));
                        }
                    }
                }

                let id =
                    chunk_id.unwrap_or_else(|| Self::point_id_string(point.id));

                SearchResult {
                    id,
                    score: point.score,
                    metadata,
                }
            })
            .collect();

        Ok(results)
    }

    #[instrument(skip(self, filter), fields(collection = %self.collection_name, namespace = %namespace, limit = limit))]
    async fn list_ids(
        &self,
        namespace: &Namespace,
        filter: &MetadataFilter,
        limit: usize,
        page_token: Option<&str>,
    ) -> Result<IdPage, VectorStoreError> {
        let scoped = Self::scoped_filter(namespace, Some(filter))?;

        let mut builder = ScrollPointsBuilder::new(&self.collection_name)
            .filter(scoped)
            .limit(limit as u32)
            .with_payload(true);
        if let Some(token) = page_token {
            builder = builder.offset(PointId::from(token.to_string()));
        }

        let response = self
            .client
            .scroll(builder)
            .await
            .map_err(|e| VectorStoreError::ListFailed(e.to_string()))?;

        let ids = response
            .result
            .into_iter()
            .map(|point| {
                let chunk_id = point
                    .payload
                    .get("chunk_id")
                    .and_then(|v| v.as_str().map(|s| s.to_string()));
                chunk_id.unwrap_or_else(|| Self::point_id_string(point.id))
            })
            .collect();

        let next_page_token = response
            .next_page_offset
            .map(|offset| Self::point_id_string(Some(offset)));

        Ok(IdPage {
            ids,
            next_page_token,
        })
    }

    #[instrument(skip(self, ids), fields(collection = %self.collection_name, namespace = %namespace, count = ids.len()))]
    async fn delete_by_ids(
        &self,
        namespace: &Namespace,
        ids: &[String],
    ) -> Result<(), VectorStoreError> {
        let point_ids: Vec<PointId> = ids
            .iter()
            .map(|id| PointId::from(Self::point_uuid(namespace, id)))
            .collect();

        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection_name)
                    .points(PointsIdsList { ids: point_ids })
                    .wait(true),
            )
            .await
            .map_err(|e| VectorStoreError::DeleteFailed(e.to_string()))?;

        info!(namespace = %namespace, count = ids.len(), "points_deleted");
        Ok(())
    }
}
