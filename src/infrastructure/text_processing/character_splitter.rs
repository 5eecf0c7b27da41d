use async_trait::async_trait;

use crate::application::ports::{TextSplitter, TextSplitterError};
use crate::domain::{Chunk, DocumentId};

/// Fixed-size splitter: hard cuts every `chunk_size` characters with an
/// optional overlap. Useful when input has no natural boundaries.
pub struct CharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl CharacterSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }
}

#[async_trait]
impl TextSplitter for CharacterSplitter {
    async fn split(
        &self,
        text: &str,
        document_id: &DocumentId,
    ) -> Result<Vec<Chunk>, TextSplitterError> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();

        if total == 0 {
            return Ok(chunks);
        }

        let size = self.chunk_size.max(1);
        let step = if size > self.chunk_overlap {
            size - self.chunk_overlap
        } else {
            size
        };

        let mut offset = 0;
        let mut index = 0;
        while offset < total {
            let end = (offset + size).min(total);
            let segment: String = chars[offset..end].iter().collect();

            chunks.push(Chunk::new(segment, document_id.clone(), index));
            index += 1;
            offset += step;
        }

        Ok(chunks)
    }
}
