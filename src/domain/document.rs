use super::chunk::DocumentId;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub filename: Option<String>,
    pub content_type: ContentType,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Pdf,
    Docx,
    Text,
}

impl ContentType {
    /// Resolve a declared MIME type. Matching is deliberately loose: upload
    /// clients send several spellings for Office documents.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.to_ascii_lowercase();
        if mime.contains("pdf") {
            Some(Self::Pdf)
        } else if mime.contains("officedocument.wordprocessingml")
            || mime.contains("msword")
            || mime.contains("word")
        {
            Some(Self::Docx)
        } else if mime.starts_with("text/") {
            Some(Self::Text)
        } else {
            None
        }
    }

    pub fn from_extension(filename: &str) -> Option<Self> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            Some(Self::Pdf)
        } else if lower.ends_with(".docx") {
            Some(Self::Docx)
        } else if lower.ends_with(".txt") || lower.ends_with(".md") {
            Some(Self::Text)
        } else {
            None
        }
    }

    /// Sniff magic bytes for uploads declared as generic octet streams.
    /// A zip signature is taken as docx; other zip payloads fail later in
    /// extraction with a diagnostic.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"%PDF-") {
            Some(Self::Pdf)
        } else if data.starts_with(&[0x50, 0x4b, 0x03, 0x04]) {
            Some(Self::Docx)
        } else {
            None
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Text => "text/plain",
        }
    }
}

impl Document {
    pub fn new(
        id: DocumentId,
        filename: Option<String>,
        content_type: ContentType,
        size_bytes: u64,
    ) -> Self {
        Self {
            id,
            filename,
            content_type,
            size_bytes,
        }
    }

    pub fn display_name(&self) -> String {
        self.filename.clone().unwrap_or_else(|| self.id.to_string())
    }
}

/// What a caller hands to ingestion: an uploaded file or raw text.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    File {
        data: Vec<u8>,
        content_type: ContentType,
        filename: Option<String>,
    },
    Text(String),
}
