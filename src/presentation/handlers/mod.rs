mod delete;
mod embed;
mod extract;
mod health;
mod ingest;
mod points;
mod query;

pub use delete::delete_document_handler;
pub use embed::embed_handler;
pub use extract::extract_handler;
pub use health::health_handler;
pub use ingest::{ingest_file_handler, ingest_text_handler};
pub use points::upsert_points_handler;
pub use query::query_handler;

use crate::domain::ContentType;

/// Resolve a document kind from, in order: an explicit `mime` form field,
/// the multipart part's declared content type, magic bytes, and finally the
/// filename extension.
pub(crate) fn resolve_content_type(
    mime_override: Option<&str>,
    declared: Option<&str>,
    filename: Option<&str>,
    data: &[u8],
) -> Option<ContentType> {
    mime_override
        .and_then(ContentType::from_mime)
        .or_else(|| declared.and_then(ContentType::from_mime))
        .or_else(|| ContentType::sniff(data))
        .or_else(|| filename.and_then(ContentType::from_extension))
}
