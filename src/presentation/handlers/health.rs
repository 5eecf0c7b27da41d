use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub collection: String,
    pub default_namespace: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
}

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            collection: state.settings.qdrant.collection_name.clone(),
            default_namespace: state.settings.index.default_namespace.clone(),
            embedding_model: state.settings.embeddings.model.clone(),
            embedding_dimension: state.settings.embeddings.dimension,
        }),
    )
}
