use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use vellum::application::ports::{CollectionConfig, VectorStore};
use vellum::application::services::{IndexingService, RetrievalService};
use vellum::infrastructure::embeddings::OpenAiEmbedder;
use vellum::infrastructure::observability::{init_tracing, TracingConfig};
use vellum::infrastructure::persistence::QdrantAdapter;
use vellum::infrastructure::text_processing::{CompositeFileLoader, TextSplitterFactory};
use vellum::presentation::{create_router, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;

    init_tracing(
        TracingConfig {
            environment: std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".to_string()),
            json_format: settings.logging.json,
        },
        settings.server.port,
    );

    anyhow::ensure!(
        !settings.embeddings.api_key.is_empty(),
        "OPENAI_API_KEY missing"
    );

    let embedder = Arc::new(OpenAiEmbedder::new(
        settings.embeddings.api_key.clone(),
        settings.embeddings.model.clone(),
        settings.embeddings.dimension,
    ));

    let vector_store = Arc::new(
        QdrantAdapter::new(&settings.qdrant.url, settings.qdrant.collection_name.clone()).await?,
    );

    // The collection's vector size is load-bearing for every stored point.
    // Create it on first run; refuse to start against a collection built at
    // a different dimension.
    let dimension = settings.embeddings.dimension as u64;
    match vector_store.collection_dimension().await? {
        Some(existing) if existing != dimension => anyhow::bail!(
            "collection '{}' holds {existing}-dimensional vectors but EMBED_DIM is {dimension}; \
             recreate the collection or fix the configuration",
            settings.qdrant.collection_name
        ),
        Some(_) => {}
        None => {
            vector_store
                .create_collection(&CollectionConfig::new(dimension))
                .await?;
        }
    }

    let file_loader = Arc::new(CompositeFileLoader::with_defaults());
    let text_splitter = TextSplitterFactory::create(&settings.chunking);

    let indexing_service = Arc::new(IndexingService::new(
        file_loader.clone(),
        embedder.clone(),
        vector_store.clone(),
        text_splitter,
        settings.embeddings.dimension,
        settings.embeddings.batch_size,
        settings.index.delete_page_size,
    ));

    let retrieval_service = Arc::new(RetrievalService::new(
        embedder.clone(),
        vector_store.clone(),
        settings.embeddings.dimension,
        settings.retrieval.default_top_k,
    ));

    let addr = SocketAddr::new(settings.server.host.parse()?, settings.server.port);

    let state = AppState {
        indexing_service,
        retrieval_service,
        file_loader,
        embedder,
        settings,
    };

    let router = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
