use async_trait::async_trait;

use crate::application::ports::{TextSplitter, TextSplitterError};
use crate::domain::{Chunk, DocumentId};

/// Splitter that cuts near a target size but snaps each cut to a natural
/// boundary found within a look-back window: a paragraph or line break
/// first, then a sentence end, then any whitespace. Only a window with no
/// whitespace at all produces a mid-word cut.
pub struct BoundarySplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    boundary_window: usize,
}

impl BoundarySplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize, boundary_window: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            boundary_window,
        }
    }

    fn snap(&self, chars: &[char], start: usize, hard_end: usize) -> usize {
        let floor = hard_end
            .saturating_sub(self.boundary_window)
            .max(start + 1);

        for pos in (floor..hard_end).rev() {
            if chars[pos] == '\n' {
                return pos;
            }
        }

        for pos in (floor..hard_end).rev() {
            if pos >= 1
                && matches!(chars[pos - 1], '.' | '!' | '?')
                && chars[pos].is_whitespace()
            {
                return pos;
            }
        }

        for pos in (floor..hard_end).rev() {
            if chars[pos].is_whitespace() {
                return pos;
            }
        }

        hard_end
    }
}

#[async_trait]
impl TextSplitter for BoundarySplitter {
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
        let mut start = 0;
        let mut index = 0;

        while start < total {
            let hard_end = (start + size).min(total);
            let end = if hard_end < total {
                self.snap(&chars, start, hard_end)
            } else {
                total
            };

            let segment: String = chars[start..end].iter().collect();
            let trimmed = segment.trim();
            if !trimmed.is_empty() {
                chunks.push(Chunk::new(trimmed.to_string(), document_id.clone(), index));
                index += 1;
            }

            start = if self.chunk_overlap > 0 && end < total && end - start > self.chunk_overlap {
                end - self.chunk_overlap
            } else {
                end
            };
        }

        Ok(chunks)
    }
}
