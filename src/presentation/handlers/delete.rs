use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::{DocumentId, Namespace};
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct DeleteDocumentRequest {
    pub document_id: String,
    pub namespace: Option<String>,
}

#[derive(Serialize)]
pub struct DeleteDocumentResponse {
    pub namespace: String,
    pub deleted: u64,
}

#[derive(Serialize)]
pub struct DeleteErrorResponse {
    pub error: String,
    pub deleted: u64,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Remove every chunk of one document. A partial failure reports how many
/// chunks were already removed; retrying resumes safely.
#[tracing::instrument(skip(state, request), fields(document_id = %request.document_id))]
pub async fn delete_document_handler(
    State(state): State<AppState>,
    Json(request): Json<DeleteDocumentRequest>,
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
        .delete_by_document(&document_id, &namespace)
        .await
    {
        Ok(deleted) => (
            StatusCode::OK,
            Json(DeleteDocumentResponse {
                namespace: namespace.to_string(),
                deleted,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, deleted = e.deleted(), "Delete interrupted");
            (
                StatusCode::BAD_GATEWAY,
                Json(DeleteErrorResponse {
                    error: e.to_string(),
                    deleted: e.deleted(),
                }),
            )
                .into_response()
        }
    }
}
