mod chunk;
mod document;
mod embedding;
mod namespace;

pub use chunk::{Chunk, ChunkId, DocumentId};
pub use document::{ContentType, Document, DocumentSource};
pub use embedding::Embedding;
pub use namespace::Namespace;
