use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::ports::EmbedderError;
use crate::application::services::{QueryRequest, RetrievalError};
use crate::domain::Namespace;
use crate::infrastructure::observability::sanitize_query;
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct QueryHttpRequest {
    pub namespace: Option<String>,
    pub text: Option<String>,
    pub vector: Option<Vec<f32>>,
    #[serde(default, alias = "topK")]
    pub top_k: Option<i64>,
    pub filter: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Serialize)]
pub struct QueryHttpResponse {
    pub namespace: String,
    pub results: Vec<QueryHit>,
}

#[derive(Serialize)]
pub struct QueryHit {
    pub id: String,
    pub score: f32,
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[tracing::instrument(skip(state, request))]
pub async fn query_handler(
    State(state): State<AppState>,
    Json(request): Json<QueryHttpRequest>,
) -> impl IntoResponse {
    if let Some(text) = &request.text {
        tracing::debug!(query = %sanitize_query(text), "Processing query");
    }

    let namespace = Namespace::resolve(
        request.namespace.as_deref(),
        &state.settings.index.default_namespace,
    );

    let query = QueryRequest {
        text: request.text,
        vector: request.vector,
        top_k: request.top_k,
        filter: request.filter,
    };

    match state.retrieval_service.query(&namespace, query).await {
        Ok(results) => {
            tracing::info!(results = results.len(), "Query successful");
            (
                StatusCode::OK,
                Json(QueryHttpResponse {
                    namespace: namespace.to_string(),
                    results: results
                        .into_iter()
                        .map(|r| QueryHit {
                            id: r.id,
                            score: r.score,
                            metadata: r.metadata,
                        })
                        .collect(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Query failed");
            let status = match &e {
                RetrievalError::InvalidQuery(_) | RetrievalError::Dimension(_) => {
                    StatusCode::BAD_REQUEST
                }
                RetrievalError::Embedding(EmbedderError::RateLimited) => {
                    StatusCode::TOO_MANY_REQUESTS
                }
                RetrievalError::Embedding(_) | RetrievalError::Search(_) => StatusCode::BAD_GATEWAY,
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
