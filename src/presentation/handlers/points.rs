use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::ports::PointRecord;
use crate::application::services::UpsertPointsError;
use crate::domain::Namespace;
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct UpsertPoint {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
pub struct UpsertRequest {
    pub namespace: Option<String>,
    pub points: Vec<UpsertPoint>,
}

#[derive(Serialize)]
pub struct UpsertResponse {
    pub namespace: String,
    pub upserted: usize,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Store caller-precomputed vectors.
#[tracing::instrument(skip(state, request), fields(count = request.points.len()))]
pub async fn upsert_points_handler(
    State(state): State<AppState>,
    Json(request): Json<UpsertRequest>,
) -> impl IntoResponse {
    let namespace = Namespace::resolve(
        request.namespace.as_deref(),
        &state.settings.index.default_namespace,
    );

    let points: Vec<PointRecord> = request
        .points
        .into_iter()
        .map(|p| PointRecord {
            id: p.id,
            vector: p.values,
            metadata: p.metadata,
        })
        .collect();

    match state.indexing_service.upsert_points(&namespace, points).await {
        Ok(upserted) => (
            StatusCode::OK,
            Json(UpsertResponse {
                namespace: namespace.to_string(),
                upserted,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Upsert failed");
            let status = match e {
                UpsertPointsError::Dimension(_) | UpsertPointsError::MissingDocumentId { .. } => {
                    StatusCode::BAD_REQUEST
                }
                UpsertPointsError::Store(_) => StatusCode::BAD_GATEWAY,
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
