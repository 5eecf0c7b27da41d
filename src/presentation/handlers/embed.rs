use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::ports::EmbedderError;
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct EmbedRequest {
    pub texts: Vec<String>,
}

#[derive(Serialize)]
pub struct EmbedResponse {
    pub vectors: Vec<Vec<f32>>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Embed a batch of texts at the configured model and dimension.
#[tracing::instrument(skip(state, request), fields(count = request.texts.len()))]
pub async fn embed_handler(
    State(state): State<AppState>,
    Json(request): Json<EmbedRequest>,
) -> impl IntoResponse {
    if request.texts.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "texts must not be empty".to_string(),
            }),
        )
            .into_response();
    }

    let texts: Vec<&str> = request.texts.iter().map(String::as_str).collect();

    match state.embedder.embed_batch(&texts).await {
        Ok(embeddings) => (
            StatusCode::OK,
            Json(EmbedResponse {
                vectors: embeddings.into_iter().map(|e| e.values).collect(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Embedding failed");
            let status = match e {
                EmbedderError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            };
            (
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
