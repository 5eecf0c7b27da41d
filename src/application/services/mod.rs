mod dimension;
mod indexing_service;
mod retrieval_service;

pub use dimension::{ensure_dimension, DimensionMismatch};
pub use indexing_service::{
    DeleteByDocumentError, IndexingService, IngestReceipt, IngestionError, UpsertPointsError,
};
pub use retrieval_service::{QueryRequest, RetrievalError, RetrievalService};
