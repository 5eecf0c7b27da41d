use std::sync::Arc;

use crate::application::ports::TextSplitter;
use crate::presentation::config::{ChunkingSettings, ChunkingStrategy};

use super::{BoundarySplitter, CharacterSplitter};

pub struct TextSplitterFactory;

impl TextSplitterFactory {
    pub fn create(settings: &ChunkingSettings) -> Arc<dyn TextSplitter> {
        match settings.strategy {
            ChunkingStrategy::Boundary => Arc::new(BoundarySplitter::new(
                settings.chunk_size,
                settings.chunk_overlap,
                settings.boundary_window,
            )),
            ChunkingStrategy::Fixed => Arc::new(CharacterSplitter::new(
                settings.chunk_size,
                settings.chunk_overlap,
            )),
        }
    }
}
