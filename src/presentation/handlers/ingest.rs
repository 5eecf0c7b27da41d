use std::collections::HashMap;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::application::ports::{EmbedderError, FileLoaderError};
use crate::application::services::IngestionError;
use crate::domain::{DocumentId, DocumentSource, Namespace};
use crate::presentation::state::AppState;

use super::resolve_content_type;

#[derive(Serialize)]
pub struct IngestResponse {
    pub document_id: String,
    pub namespace: String,
    pub chunks_indexed: usize,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize)]
pub struct IngestTextRequest {
    pub document_id: String,
    pub text: String,
    pub namespace: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

fn status_for(error: &IngestionError) -> StatusCode {
    match error {
        IngestionError::Extraction(FileLoaderError::UnsupportedContentType(_)) => {
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        }
        IngestionError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        IngestionError::Embedding(EmbedderError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
        IngestionError::Embedding(_) | IngestionError::Store(_) => StatusCode::BAD_GATEWAY,
        IngestionError::Splitting(_) | IngestionError::Dimension(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Multipart upload: `file` plus `document_id`, with optional `namespace`,
/// `mime` and `title` fields.
#[tracing::instrument(skip(state, multipart))]
pub async fn ingest_file_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut upload: Option<(Vec<u8>, Option<String>, Option<String>)> = None;
    let mut document_id: Option<String> = None;
    let mut namespace: Option<String> = None;
    let mut mime_override: Option<String> = None;
    let mut title: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("Failed to read multipart: {}", e),
                    }),
                )
                    .into_response();
            }
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().map(str::to_string);
                let declared = field.content_type().map(str::to_string);
                match field.bytes().await {
                    Ok(data) => upload = Some((data.to_vec(), filename, declared)),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to read file bytes");
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(ErrorResponse {
                                error: format!("Failed to read file: {}", e),
                            }),
                        )
                            .into_response();
                    }
                }
            }
            Some("document_id") => document_id = field.text().await.ok(),
            Some("namespace") => namespace = field.text().await.ok(),
            Some("mime") => mime_override = field.text().await.ok(),
            Some("title") => title = field.text().await.ok(),
            _ => {}
        }
    }

    let Some((data, filename, declared)) = upload else {
        tracing::warn!("Ingest request with no file");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "No file uploaded".to_string(),
            }),
        )
            .into_response();
    };

    let document_id = DocumentId::new(document_id.unwrap_or_default());
    if document_id.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "document_id is required".to_string(),
            }),
        )
            .into_response();
    }

    let Some(content_type) = resolve_content_type(
        mime_override.as_deref(),
        declared.as_deref(),
        filename.as_deref(),
        &data,
    ) else {
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(ErrorResponse {
                error: format!(
                    "Unsupported content type: {}",
                    declared.as_deref().unwrap_or("unknown")
                ),
            }),
        )
            .into_response();
    };

    let mut metadata = HashMap::new();
    if let Some(title) = title {
        metadata.insert("title".to_string(), json!(title));
    }
    if let Some(filename) = &filename {
        metadata.insert("source".to_string(), json!(filename));
    }

    let namespace = Namespace::resolve(
        namespace.as_deref(),
        &state.settings.index.default_namespace,
    );

    let source = DocumentSource::File {
        data,
        content_type,
        filename,
    };

    match state
        .indexing_service
        .ingest(document_id, source, metadata, &namespace)
        .await
    {
        Ok(receipt) => (
            StatusCode::OK,
            Json(IngestResponse {
                document_id: receipt.document_id.to_string(),
                namespace: namespace.to_string(),
                chunks_indexed: receipt.chunks_indexed,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Ingestion failed");
            (
                status_for(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Raw-text ingestion; the text takes the plain-text normalize path.
#[tracing::instrument(skip(state, request), fields(document_id = %request.document_id))]
pub async fn ingest_text_handler(
    State(state): State<AppState>,
    Json(request): Json<IngestTextRequest>,
) -> impl IntoResponse {
    let document_id = DocumentId::new(request.document_id);
    if document_id.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "document_id is required".to_string(),
            }),
        )
            .into_response();
    }

    let namespace = Namespace::resolve(
        request.namespace.as_deref(),
        &state.settings.index.default_namespace,
    );

    match state
        .indexing_service
        .ingest(
            document_id,
            DocumentSource::Text(request.text),
            request.metadata,
            &namespace,
        )
        .await
    {
        Ok(receipt) => (
            StatusCode::OK,
            Json(IngestResponse {
                document_id: receipt.document_id.to_string(),
                namespace: namespace.to_string(),
                chunks_indexed: receipt.chunks_indexed,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Ingestion failed");
            (
                status_for(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
