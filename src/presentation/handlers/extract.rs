use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::application::ports::FileLoaderError;
use crate::domain::{Document, DocumentId};
use crate::presentation::state::AppState;

use super::resolve_content_type;

#[derive(Serialize)]
pub struct ExtractResponse {
    pub text: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Normalize an uploaded file to plain text without indexing it.
#[tracing::instrument(skip(state, multipart))]
pub async fn extract_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut upload: Option<(Vec<u8>, Option<String>, Option<String>)> = None;
    let mut mime_override: Option<String> = None;

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
            Some("mime") => {
                mime_override = field.text().await.ok();
            }
            _ => {}
        }
    }

    let Some((data, filename, declared)) = upload else {
        tracing::warn!("Extract request with no file");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "No file uploaded".to_string(),
            }),
        )
            .into_response();
    };

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

    let id = DocumentId::new(filename.clone().unwrap_or_else(|| "upload".to_string()));
    let document = Document::new(id, filename, content_type, data.len() as u64);

    match state.file_loader.extract_text(&data, &document).await {
        Ok(text) => (StatusCode::OK, Json(ExtractResponse { text })).into_response(),
        Err(e @ FileLoaderError::UnsupportedContentType(_)) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}
