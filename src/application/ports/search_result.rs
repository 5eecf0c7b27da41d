use std::collections::HashMap;

/// A single similarity hit. `score` is the store's native similarity under
/// the collection metric (cosine here: higher is closer, in [-1, 1]).
/// Results keep the store's ranking order; nothing re-ranks them.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub id: String,
    pub score: f32,
    pub metadata: HashMap<String, serde_json::Value>,
}
