use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    delete_document_handler, embed_handler, extract_handler, health_handler, ingest_file_handler,
    ingest_text_handler, query_handler, upsert_points_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/extract", post(extract_handler))
        .route("/api/v1/embed", post(embed_handler))
        .route("/api/v1/ingest", post(ingest_file_handler))
        .route("/api/v1/ingest/text", post(ingest_text_handler))
        .route("/api/v1/points", post(upsert_points_handler))
        .route("/api/v1/documents/delete", post(delete_document_handler))
        .route("/api/v1/query", post(query_handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
