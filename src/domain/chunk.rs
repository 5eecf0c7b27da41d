use std::fmt;

/// Caller-supplied document identifier, unique within a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chunk identifier derived from the owning document and the chunk's
/// position, so re-ingesting a document writes to the same ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkId(String);

impl ChunkId {
    pub fn derive(document_id: &DocumentId, index: usize) -> Self {
        Self(format!("{}#{}", document_id.as_str(), index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bounded text segment, the unit of embedding and storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub id: ChunkId,
    pub document_id: DocumentId,
    pub index: usize,
    pub text: String,
}

impl Chunk {
    pub fn new(text: String, document_id: DocumentId, index: usize) -> Self {
        Self {
            id: ChunkId::derive(&document_id, index),
            document_id,
            index,
            text,
        }
    }
}
