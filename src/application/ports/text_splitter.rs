use async_trait::async_trait;

use crate::domain::{Chunk, DocumentId};

/// Splits normalized text into an ordered sequence of bounded segments.
/// Empty input yields an empty sequence, not an error.
#[async_trait]
pub trait TextSplitter: Send + Sync {
    async fn split(
        &self,
        text: &str,
        document_id: &DocumentId,
    ) -> Result<Vec<Chunk>, TextSplitterError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TextSplitterError {
    #[error("splitting failed: {0}")]
    SplittingFailed(String),
}
