use std::sync::Arc;

use crate::application::ports::{Embedder, FileLoader};
use crate::application::services::{IndexingService, RetrievalService};
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub indexing_service: Arc<IndexingService>,
    pub retrieval_service: Arc<RetrievalService>,
    pub file_loader: Arc<dyn FileLoader>,
    pub embedder: Arc<dyn Embedder>,
    pub settings: Settings,
}
