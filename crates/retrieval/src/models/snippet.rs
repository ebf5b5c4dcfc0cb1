use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An atomic, retrievable unit of candidate history.
///
/// Created once per extraction pass and never mutated; a profile change
/// means re-extracting and rebuilding the whole index. `content` is
/// non-empty by construction (the extractor always interpolates a template).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    /// Human-readable sentence, e.g. "At Acme as Engineer: built caching layer".
    pub content: String,
    /// Provenance: `type` ∈ {"experience", "project"}, plus `company`/`title`
    /// or `name` depending on the type.
    pub metadata: HashMap<String, String>,
}

impl Snippet {
    pub fn new(content: String, metadata: HashMap<String, String>) -> Self {
        Self { content, metadata }
    }
}
