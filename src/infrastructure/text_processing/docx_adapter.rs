use std::io::{Cursor, Read};

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{ContentType, Document};

use super::text_sanitizer::sanitize_extracted_text;

#[derive(Default)]
pub struct DocxAdapter;

impl DocxAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileLoader for DocxAdapter {
    #[tracing::instrument(
        skip(self, data),
        fields(document_id = %document.id, bytes = data.len())
    )]
    async fn extract_text(
        &self,
        data: &[u8],
        document: &Document,
    ) -> Result<String, FileLoaderError> {
        if document.content_type != ContentType::Docx {
            return Err(FileLoaderError::UnsupportedContentType(
                document.content_type.as_mime().to_string(),
            ));
        }

        let xml = read_document_xml(data)?;
        let raw = drain_text_runs(&xml)?;

        let text = sanitize_extracted_text(&raw);
        if text.is_empty() {
            return Err(FileLoaderError::NoTextFound(document.display_name()));
        }

        tracing::info!(chars = text.len(), "docx_text_extracted");
        Ok(text)
    }
}

/// A .docx file is a zip container; the document body lives in
/// `word/document.xml`.
fn read_document_xml(data: &[u8]) -> Result<String, FileLoaderError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| FileLoaderError::ExtractionFailed(format!("not a docx container: {e}")))?;

    let mut entry = archive.by_name("word/document.xml").map_err(|e| {
        FileLoaderError::ExtractionFailed(format!("word/document.xml missing: {e}"))
    })?;

    let mut xml = String::new();
    entry.read_to_string(&mut xml).map_err(|e| {
        FileLoaderError::ExtractionFailed(format!("failed to read document body: {e}"))
    })?;

    Ok(xml)
}

/// Collect the text runs, emitting paragraph breaks at `w:p` ends so the
/// splitter still sees paragraph boundaries.
fn drain_text_runs(xml: &str) -> Result<String, FileLoaderError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| {
                    FileLoaderError::ExtractionFailed(format!("malformed document xml: {e}"))
                })?;
                out.push_str(&text);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => out.push_str("\n\n"),
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:br" => out.push('\n'),
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:tab" => out.push(' '),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(FileLoaderError::ExtractionFailed(format!(
                    "malformed document xml: {e}"
                )));
            }
        }
    }

    Ok(out)
}
