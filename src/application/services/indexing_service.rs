use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use crate::application::ports::{
    Embedder, EmbedderError, FileLoader, FileLoaderError, MetadataFilter, PointRecord,
    TextSplitter, TextSplitterError, VectorStore, VectorStoreError,
};
use crate::domain::{Chunk, ContentType, Document, DocumentId, DocumentSource, Embedding, Namespace};

use super::dimension::{ensure_dimension, DimensionMismatch};

pub struct IndexingService {
    file_loader: Arc<dyn FileLoader>,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    text_splitter: Arc<dyn TextSplitter>,
    embedding_dimension: usize,
    embed_batch_size: usize,
    delete_page_size: usize,
}

#[derive(Debug, Clone)]
pub struct IngestReceipt {
    pub document_id: DocumentId,
    pub chunks_indexed: usize,
}

impl IndexingService {
    pub fn new(
        file_loader: Arc<dyn FileLoader>,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        text_splitter: Arc<dyn TextSplitter>,
        embedding_dimension: usize,
        embed_batch_size: usize,
        delete_page_size: usize,
    ) -> Self {
        Self {
            file_loader,
            embedder,
            vector_store,
            text_splitter,
            embedding_dimension,
            embed_batch_size,
            delete_page_size,
        }
    }

    /// Ingest one document: normalize, chunk, embed, upsert.
    ///
    /// Chunk ids are derived from the document id and chunk position, so
    /// re-ingesting a `document_id` overwrites vectors id-for-id. Chunks left
    /// over from an earlier, longer ingestion are NOT removed; callers that
    /// re-chunk a shrinking document should delete it first.
    #[tracing::instrument(
        skip(self, source, metadata),
        fields(document_id = %document_id, namespace = %namespace)
    )]
    pub async fn ingest(
        &self,
        document_id: DocumentId,
        source: DocumentSource,
        metadata: HashMap<String, serde_json::Value>,
        namespace: &Namespace,
    ) -> Result<IngestReceipt, IngestionError> {
        let (data, content_type, filename) = match source {
            DocumentSource::File {
                data,
                content_type,
                filename,
            } => (data, content_type, filename),
            DocumentSource::Text(text) => (text.into_bytes(), ContentType::Text, None),
        };

        let document = Document::new(
            document_id.clone(),
            filename,
            content_type,
            data.len() as u64,
        );
        let text = self.file_loader.extract_text(&data, &document).await?;

        let chunks = self.text_splitter.split(&text, &document_id).await?;

        if chunks.is_empty() {
            tracing::info!("document produced no chunks");
            return Ok(IngestReceipt {
                document_id,
                chunks_indexed: 0,
            });
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embed_in_batches(&texts).await?;

        for embedding in &embeddings {
            ensure_dimension(self.embedding_dimension, embedding.dimensions())?;
        }

        let points: Vec<PointRecord> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| self.point_for(chunk, embedding.values, &metadata))
            .collect();

        self.vector_store.upsert(namespace, &points).await?;

        tracing::info!(chunks = points.len(), "document_indexed");

        Ok(IngestReceipt {
            document_id,
            chunks_indexed: points.len(),
        })
    }

    /// Store caller-precomputed vectors. Every vector is checked against the
    /// collection dimension and every point must carry `document_id`
    /// metadata before anything is written; one bad point rejects the whole
    /// batch.
    #[tracing::instrument(skip(self, points), fields(namespace = %namespace, count = points.len()))]
    pub async fn upsert_points(
        &self,
        namespace: &Namespace,
        points: Vec<PointRecord>,
    ) -> Result<usize, UpsertPointsError> {
        for point in &points {
            ensure_dimension(self.embedding_dimension, point.vector.len())?;
            if !point.metadata.contains_key("document_id") {
                return Err(UpsertPointsError::MissingDocumentId {
                    id: point.id.clone(),
                });
            }
        }

        if points.is_empty() {
            return Ok(0);
        }

        self.vector_store.upsert(namespace, &points).await?;

        tracing::info!(count = points.len(), "points_upserted");
        Ok(points.len())
    }

    /// Remove every chunk whose metadata `document_id` matches, however many
    /// store pages the matches span.
    ///
    /// Each round lists the first page of remaining matches and deletes it;
    /// deleting a page shifts what the next listing returns, so the cursor
    /// restarts instead of following a page token. A short or empty page
    /// means nothing remains. Deletes are idempotent per id: retrying after
    /// a failure resumes where the last run stopped, and a second full run
    /// reports zero.
    #[tracing::instrument(skip(self), fields(document_id = %document_id, namespace = %namespace))]
    pub async fn delete_by_document(
        &self,
        document_id: &DocumentId,
        namespace: &Namespace,
    ) -> Result<u64, DeleteByDocumentError> {
        let filter: MetadataFilter = HashMap::from([(
            "document_id".to_string(),
            json!(document_id.as_str()),
        )]);
        let page_size = self.delete_page_size.max(1);

        let mut deleted: u64 = 0;
        loop {
            let page = self
                .vector_store
                .list_ids(namespace, &filter, page_size, None)
                .await
                .map_err(|source| DeleteByDocumentError::PartialDelete { deleted, source })?;

            if page.ids.is_empty() {
                break;
            }

            self.vector_store
                .delete_by_ids(namespace, &page.ids)
                .await
                .map_err(|source| DeleteByDocumentError::PartialDelete { deleted, source })?;

            deleted += page.ids.len() as u64;

            if page.ids.len() < page_size {
                break;
            }
        }

        tracing::info!(deleted, "document_chunks_deleted");
        Ok(deleted)
    }

    /// Providers cap how many inputs one embeddings call may carry, so
    /// oversized chunk lists are split into several calls and the resulting
    /// vectors reassembled in input order.
    async fn embed_in_batches(&self, texts: &[&str]) -> Result<Vec<Embedding>, IngestionError> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.embed_batch_size.max(1)) {
            let mut batch_embeddings = self.embedder.embed_batch(batch).await?;

            if batch_embeddings.len() != batch.len() {
                return Err(IngestionError::Embedding(EmbedderError::InvalidResponse(
                    format!(
                        "expected {} vectors, got {}",
                        batch.len(),
                        batch_embeddings.len()
                    ),
                )));
            }

            embeddings.append(&mut batch_embeddings);
        }

        Ok(embeddings)
    }

    fn point_for(
        &self,
        chunk: &Chunk,
        vector: Vec<f32>,
        extra: &HashMap<String, serde_json::Value>,
    ) -> PointRecord {
        let mut metadata = extra.clone();
        metadata.insert("document_id".to_string(), json!(chunk.document_id.as_str()));
        metadata.insert("chunk_index".to_string(), json!(chunk.index));
        metadata.insert("text".to_string(), json!(chunk.text));

        PointRecord {
            id: chunk.id.to_string(),
            vector,
            metadata,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("file loading: {0}")]
    Extraction(#[from] FileLoaderError),
    #[error("text splitting: {0}")]
    Splitting(#[from] TextSplitterError),
    #[error("embedding: {0}")]
    Embedding(#[from] EmbedderError),
    #[error(transparent)]
    Dimension(#[from] DimensionMismatch),
    #[error("storage: {0}")]
    Store(#[from] VectorStoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum UpsertPointsError {
    #[error(transparent)]
    Dimension(#[from] DimensionMismatch),
    #[error("point {id} missing document_id metadata")]
    MissingDocumentId { id: String },
    #[error("storage: {0}")]
    Store(#[from] VectorStoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteByDocumentError {
    #[error("delete interrupted after {deleted} chunks: {source}")]
    PartialDelete {
        deleted: u64,
        source: VectorStoreError,
    },
}

impl DeleteByDocumentError {
    /// Chunks already removed before the loop was interrupted.
    pub fn deleted(&self) -> u64 {
        match self {
            Self::PartialDelete { deleted, .. } => *deleted,
        }
    }
}
