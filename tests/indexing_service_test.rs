use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use vellum::application::ports::{
    CollectionConfig, Embedder, EmbedderError, IdPage, MetadataFilter, PointRecord, SearchResult,
    TextSplitter, VectorStore, VectorStoreError,
};
use vellum::application::services::{
    IndexingService, IngestionError, QueryRequest, RetrievalService, UpsertPointsError,
};
use vellum::domain::{DocumentId, DocumentSource, Embedding, Namespace};
use vellum::infrastructure::persistence::InMemoryVectorStore;
use vellum::infrastructure::text_processing::{BoundarySplitter, CompositeFileLoader};

const DIM: usize = 64;
const PAGE_SIZE: usize = 4;
const CHUNK_SIZE: usize = 40;

/// Deterministic bag-of-words embedder; similar texts land near each other,
/// so retrieval behaves like the real thing without a network.
struct HashEmbedder {
    dimensions: usize,
    batch_sizes: Mutex<Vec<usize>>,
}

impl HashEmbedder {
    fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            batch_sizes: Mutex::new(Vec::new()),
        }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut values = vec![0.0f32; self.dimensions];
        for word in text.split_whitespace() {
            let token: String = word
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if token.is_empty() {
                continue;
            }
            let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
            for byte in token.bytes() {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(0x0100_0000_01b3);
            }
            values[(hash % self.dimensions as u64) as usize] += 1.0;
        }
        values
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedderError> {
        Ok(Embedding::new(self.vector_for(text)))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        self.batch_sizes.lock().unwrap().push(texts.len());
        Ok(texts
            .iter()
            .map(|t| Embedding::new(self.vector_for(t)))
            .collect())
    }
}

/// Embedder whose vectors are one element too long.
struct WrongDimensionEmbedder;

#[async_trait]
impl Embedder for WrongDimensionEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding, EmbedderError> {
        Ok(Embedding::new(vec![0.5; DIM + 1]))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        Ok(texts
            .iter()
            .map(|_| Embedding::new(vec![0.5; DIM + 1]))
            .collect())
    }
}

/// Store whose delete call fails exactly once, on the given call index.
struct FlakyDeleteStore {
    inner: InMemoryVectorStore,
    delete_calls: AtomicUsize,
    fail_on_call: usize,
}

impl FlakyDeleteStore {
    fn new(dimensions: u64, fail_on_call: usize) -> Self {
        Self {
            inner: InMemoryVectorStore::new(dimensions),
            delete_calls: AtomicUsize::new(0),
            fail_on_call,
        }
    }
}

#[async_trait]
impl VectorStore for FlakyDeleteStore {
    async fn create_collection(&self, config: &CollectionConfig) -> Result<bool, VectorStoreError> {
        self.inner.create_collection(config).await
    }

    async fn collection_exists(&self) -> Result<bool, VectorStoreError> {
        self.inner.collection_exists().await
    }

    async fn collection_dimension(&self) -> Result<Option<u64>, VectorStoreError> {
        self.inner.collection_dimension().await
    }

    async fn upsert(
        &self,
        namespace: &Namespace,
        points: &[PointRecord],
    ) -> Result<(), VectorStoreError> {
        self.inner.upsert(namespace, points).await
    }

    async fn query(
        &self,
        namespace: &Namespace,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        self.inner.query(namespace, vector, top_k, filter).await
    }

    async fn list_ids(
        &self,
        namespace: &Namespace,
        filter: &MetadataFilter,
        limit: usize,
        page_token: Option<&str>,
    ) -> Result<IdPage, VectorStoreError> {
        self.inner.list_ids(namespace, filter, limit, page_token).await
    }

    async fn delete_by_ids(
        &self,
        namespace: &Namespace,
        ids: &[String],
    ) -> Result<(), VectorStoreError> {
        let call = self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if call == self.fail_on_call {
            return Err(VectorStoreError::DeleteFailed(
                "simulated outage".to_string(),
            ));
        }
        self.inner.delete_by_ids(namespace, ids).await
    }
}

fn namespace() -> Namespace {
    Namespace::new("default")
}

fn service(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, batch: usize) -> IndexingService {
    IndexingService::new(
        Arc::new(CompositeFileLoader::with_defaults()),
        embedder,
        store,
        Arc::new(BoundarySplitter::new(CHUNK_SIZE, 0, 12)),
        DIM,
        batch,
        PAGE_SIZE,
    )
}

fn doc_filter(document_id: &str) -> MetadataFilter {
    HashMap::from([("document_id".to_string(), json!(document_id))])
}

fn points_for(document_id: &str, count: usize) -> Vec<PointRecord> {
    (0..count)
        .map(|i| PointRecord {
            id: format!("{document_id}#{i}"),
            vector: vec![0.25; DIM],
            metadata: HashMap::from([("document_id".to_string(), json!(document_id))]),
        })
        .collect()
}

async fn all_ids(store: &dyn VectorStore, document_id: &str) -> Vec<String> {
    store
        .list_ids(&namespace(), &doc_filter(document_id), 10_000, None)
        .await
        .unwrap()
        .ids
}

#[tokio::test]
async fn given_raw_text_when_ingesting_then_every_chunk_lands_in_the_store() {
    let embedder = Arc::new(HashEmbedder::new(DIM));
    let store = Arc::new(InMemoryVectorStore::new(DIM as u64));
    let service = service(embedder, store.clone(), 16);

    let words: Vec<String> = (0..60).map(|i| format!("w{:04}", i)).collect();
    let receipt = service
        .ingest(
            DocumentId::new("doc"),
            DocumentSource::Text(words.join(" ")),
            HashMap::new(),
            &namespace(),
        )
        .await
        .unwrap();

    assert!(receipt.chunks_indexed > 1);
    let ids = all_ids(store.as_ref(), "doc").await;
    assert_eq!(ids.len(), receipt.chunks_indexed);
    assert!(ids.contains(&"doc#0".to_string()));
}

#[tokio::test]
async fn given_empty_text_when_ingesting_then_zero_chunks_and_no_write() {
    let embedder = Arc::new(HashEmbedder::new(DIM));
    let store = Arc::new(InMemoryVectorStore::new(DIM as u64));
    let service = service(embedder, store.clone(), 16);

    let receipt = service
        .ingest(
            DocumentId::new("doc"),
            DocumentSource::Text(String::new()),
            HashMap::new(),
            &namespace(),
        )
        .await
        .unwrap();

    assert_eq!(receipt.chunks_indexed, 0);
    assert!(all_ids(store.as_ref(), "doc").await.is_empty());
}

#[tokio::test]
async fn given_ingested_documents_when_querying_a_phrase_then_its_document_ranks_first() {
    let embedder = Arc::new(HashEmbedder::new(DIM));
    let store = Arc::new(InMemoryVectorStore::new(DIM as u64));
    let service = service(embedder.clone(), store.clone(), 16);

    service
        .ingest(
            DocumentId::new("solar"),
            DocumentSource::Text(
                "Solar panels convert sunlight into electricity using photovoltaic cells."
                    .to_string(),
            ),
            HashMap::new(),
            &namespace(),
        )
        .await
        .unwrap();
    service
        .ingest(
            DocumentId::new("pasta"),
            DocumentSource::Text(
                "Fresh pasta dough combines flour eggs and a pinch of salt.".to_string(),
            ),
            HashMap::new(),
            &namespace(),
        )
        .await
        .unwrap();

    let retrieval = RetrievalService::new(embedder, store, DIM, 5);
    let results = retrieval
        .query(
            &namespace(),
            QueryRequest {
                text: Some("sunlight electricity photovoltaic".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(!results.is_empty());
    assert_eq!(results[0].metadata["document_id"], json!("solar"));
}

#[tokio::test]
async fn given_provider_returning_wrong_dimension_when_ingesting_then_mismatch_and_no_write() {
    let store = Arc::new(InMemoryVectorStore::new(DIM as u64));
    let service = service(Arc::new(WrongDimensionEmbedder), store.clone(), 16);

    let result = service
        .ingest(
            DocumentId::new("doc"),
            DocumentSource::Text("some text worth indexing".to_string()),
            HashMap::new(),
            &namespace(),
        )
        .await;

    match result {
        Err(IngestionError::Dimension(mismatch)) => {
            assert_eq!(mismatch.expected, DIM);
            assert_eq!(mismatch.actual, DIM + 1);
        }
        other => panic!("expected dimension mismatch, got {other:?}"),
    }
    assert!(all_ids(store.as_ref(), "doc").await.is_empty());
}

#[tokio::test]
async fn given_one_bad_vector_when_upserting_points_then_whole_batch_is_rejected() {
    let embedder = Arc::new(HashEmbedder::new(DIM));
    let store = Arc::new(InMemoryVectorStore::new(DIM as u64));
    let service = service(embedder, store.clone(), 16);

    let mut points = points_for("doc", 3);
    points[1].vector = vec![0.25; DIM - 1];

    let result = service.upsert_points(&namespace(), points).await;

    assert!(matches!(result, Err(UpsertPointsError::Dimension(_))));
    assert!(all_ids(store.as_ref(), "doc").await.is_empty());
}

#[tokio::test]
async fn given_point_without_document_id_when_upserting_then_rejected() {
    let embedder = Arc::new(HashEmbedder::new(DIM));
    let store = Arc::new(InMemoryVectorStore::new(DIM as u64));
    let service = service(embedder, store.clone(), 16);

    let points = vec![PointRecord {
        id: "stray#0".to_string(),
        vector: vec![0.25; DIM],
        metadata: HashMap::new(),
    }];

    let result = service.upsert_points(&namespace(), points).await;

    assert!(matches!(
        result,
        Err(UpsertPointsError::MissingDocumentId { .. })
    ));
}

#[tokio::test]
async fn given_any_number_of_store_pages_when_deleting_a_document_then_nothing_survives() {
    for count in [0, 1, PAGE_SIZE, PAGE_SIZE + 1, 3 * PAGE_SIZE + 1] {
        let embedder = Arc::new(HashEmbedder::new(DIM));
        let store = Arc::new(InMemoryVectorStore::new(DIM as u64));
        let service = service(embedder, store.clone(), 16);

        if count > 0 {
            service
                .upsert_points(&namespace(), points_for("bulk", count))
                .await
                .unwrap();
        }
        service
            .upsert_points(&namespace(), points_for("other", 2))
            .await
            .unwrap();

        let deleted = service
            .delete_by_document(&DocumentId::new("bulk"), &namespace())
            .await
            .unwrap();

        assert_eq!(deleted, count as u64, "with {count} chunks");
        assert!(
            all_ids(store.as_ref(), "bulk").await.is_empty(),
            "chunks left behind with {count} chunks"
        );
        assert_eq!(all_ids(store.as_ref(), "other").await.len(), 2);
    }
}

#[tokio::test]
async fn given_already_deleted_document_when_deleting_again_then_reports_zero() {
    let embedder = Arc::new(HashEmbedder::new(DIM));
    let store = Arc::new(InMemoryVectorStore::new(DIM as u64));
    let service = service(embedder, store.clone(), 16);

    service
        .upsert_points(&namespace(), points_for("doc", PAGE_SIZE + 2))
        .await
        .unwrap();

    let first = service
        .delete_by_document(&DocumentId::new("doc"), &namespace())
        .await
        .unwrap();
    let second = service
        .delete_by_document(&DocumentId::new("doc"), &namespace())
        .await
        .unwrap();

    assert_eq!(first, (PAGE_SIZE + 2) as u64);
    assert_eq!(second, 0);
}

#[tokio::test]
async fn given_store_outage_mid_loop_when_deleting_then_partial_progress_is_reported() {
    let embedder = Arc::new(HashEmbedder::new(DIM));
    let store = Arc::new(FlakyDeleteStore::new(DIM as u64, 1));
    let service = service(embedder, store.clone(), 16);

    service
        .upsert_points(&namespace(), points_for("doc", 3 * PAGE_SIZE))
        .await
        .unwrap();

    let error = service
        .delete_by_document(&DocumentId::new("doc"), &namespace())
        .await
        .unwrap_err();

    assert_eq!(error.deleted(), PAGE_SIZE as u64);
    assert_eq!(
        all_ids(store.as_ref(), "doc").await.len(),
        2 * PAGE_SIZE
    );

    // The operation is resumable: a retry drains what remains.
    let deleted = service
        .delete_by_document(&DocumentId::new("doc"), &namespace())
        .await
        .unwrap();
    assert_eq!(deleted, (2 * PAGE_SIZE) as u64);
    assert!(all_ids(store.as_ref(), "doc").await.is_empty());
}

#[tokio::test]
async fn given_reingested_document_when_querying_then_new_content_wins() {
    let embedder = Arc::new(HashEmbedder::new(DIM));
    let store = Arc::new(InMemoryVectorStore::new(DIM as u64));
    let service = service(embedder.clone(), store.clone(), 16);

    service
        .ingest(
            DocumentId::new("subject"),
            DocumentSource::Text("glaciers carve valleys slowly".to_string()),
            HashMap::new(),
            &namespace(),
        )
        .await
        .unwrap();
    service
        .ingest(
            DocumentId::new("control"),
            DocumentSource::Text("glaciers advance and retreat".to_string()),
            HashMap::new(),
            &namespace(),
        )
        .await
        .unwrap();

    // Overwrite the subject document with unrelated content.
    service
        .ingest(
            DocumentId::new("subject"),
            DocumentSource::Text("sourdough starter needs daily feeding".to_string()),
            HashMap::new(),
            &namespace(),
        )
        .await
        .unwrap();

    assert_eq!(all_ids(store.as_ref(), "subject").await.len(), 1);

    let retrieval = RetrievalService::new(embedder, store, DIM, 2);
    let old_topic = retrieval
        .query(
            &namespace(),
            QueryRequest {
                text: Some("glaciers carve valleys".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(old_topic[0].metadata["document_id"], json!("control"));

    let new_topic = retrieval
        .query(
            &namespace(),
            QueryRequest {
                text: Some("sourdough starter feeding".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(new_topic[0].metadata["document_id"], json!("subject"));
}

#[tokio::test]
async fn given_more_chunks_than_the_provider_batch_when_ingesting_then_calls_split_in_order() {
    let embedder = Arc::new(HashEmbedder::new(DIM));
    let store = Arc::new(InMemoryVectorStore::new(DIM as u64));
    let service = service(embedder.clone(), store.clone(), 3);

    let words: Vec<String> = (0..80).map(|i| format!("w{:04}", i)).collect();
    let text = words.join(" ");

    let splitter = BoundarySplitter::new(CHUNK_SIZE, 0, 12);
    let expected_chunks = splitter
        .split(&text, &DocumentId::new("doc"))
        .await
        .unwrap();

    let receipt = service
        .ingest(
            DocumentId::new("doc"),
            DocumentSource::Text(text),
            HashMap::new(),
            &namespace(),
        )
        .await
        .unwrap();

    assert_eq!(receipt.chunks_indexed, expected_chunks.len());

    let batch_sizes = embedder.batch_sizes.lock().unwrap().clone();
    let mut remaining = expected_chunks.len();
    for size in &batch_sizes {
        assert!(*size <= 3);
        remaining -= size;
    }
    assert_eq!(remaining, 0);

    // Order survives the batch boundary: the last chunk's stored vector is
    // still nearest to an embedding of its own text.
    let last = expected_chunks.last().unwrap();
    let results = store
        .query(
            &namespace(),
            &embedder.vector_for(&last.text),
            1,
            None,
        )
        .await
        .unwrap();
    assert_eq!(results[0].id, last.id.as_str());
}

#[tokio::test]
async fn given_many_matches_when_listing_ids_then_pages_are_disjoint_and_complete() {
    let store = InMemoryVectorStore::new(DIM as u64);
    store
        .upsert(&namespace(), &points_for("doc", 7))
        .await
        .unwrap();

    let first = store
        .list_ids(&namespace(), &doc_filter("doc"), 5, None)
        .await
        .unwrap();
    assert_eq!(first.ids.len(), 5);
    let token = first.next_page_token.clone().unwrap();

    let second = store
        .list_ids(&namespace(), &doc_filter("doc"), 5, Some(&token))
        .await
        .unwrap();
    assert_eq!(second.ids.len(), 2);
    assert!(second.next_page_token.is_none());

    let mut all: Vec<String> = first.ids.into_iter().chain(second.ids).collect();
    all.sort();
    let expected: Vec<String> = (0..7).map(|i| format!("doc#{i}")).collect();
    assert_eq!(all, expected);
}

#[tokio::test]
async fn given_two_namespaces_when_deleting_in_one_then_the_other_is_untouched() {
    let embedder = Arc::new(HashEmbedder::new(DIM));
    let store = Arc::new(InMemoryVectorStore::new(DIM as u64));
    let service = service(embedder, store.clone(), 16);

    let ns_a = Namespace::new("tenant-a");
    let ns_b = Namespace::new("tenant-b");

    service
        .upsert_points(&ns_a, points_for("doc", 3))
        .await
        .unwrap();
    service
        .upsert_points(&ns_b, points_for("doc", 3))
        .await
        .unwrap();

    let deleted = service
        .delete_by_document(&DocumentId::new("doc"), &ns_a)
        .await
        .unwrap();

    assert_eq!(deleted, 3);
    let left_in_a = store
        .list_ids(&ns_a, &doc_filter("doc"), 100, None)
        .await
        .unwrap();
    let left_in_b = store
        .list_ids(&ns_b, &doc_filter("doc"), 100, None)
        .await
        .unwrap();
    assert!(left_in_a.ids.is_empty());
    assert_eq!(left_in_b.ids.len(), 3);
}
