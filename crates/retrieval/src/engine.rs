//! Retrieval Engine — answers `retrieve(query, top_k)` over a snippet index.
//!
//! Two ranking strategies: semantic (embedding inner product) when the index
//! holds vectors and the provider answers, and keyword overlap otherwise.
//! A per-call semantic failure degrades that call only; the next call
//! retries the semantic path.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::embedding::EmbeddingProvider;
use crate::errors::RetrievalError;
use crate::extractor::extract_snippets;
use crate::index::{Index, SharedIndex};
use crate::models::{Profile, Snippet};

/// Result-size default used by the surrounding document generators.
pub const DEFAULT_TOP_K: usize = 15;

pub struct RetrievalEngine {
    index: SharedIndex,
    provider: Option<Arc<dyn EmbeddingProvider>>,
}

impl RetrievalEngine {
    /// Builds an engine from a profile: extract snippets, batch-embed them,
    /// wrap the index for shared read access.
    pub async fn from_profile(
        profile: &Profile,
        provider: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Result<Self, RetrievalError> {
        let index = Self::build_index(profile, provider.as_deref()).await?;
        Ok(Self {
            index: SharedIndex::new(index),
            provider,
        })
    }

    /// Rebuilds the index from a changed profile and swaps it in atomically.
    /// Snippets are regenerated and re-embedded wholesale; there are no
    /// partial updates.
    pub async fn rebuild(&self, profile: &Profile) -> Result<(), RetrievalError> {
        let index = Self::build_index(profile, self.provider.as_deref()).await?;
        self.index.swap(index);
        Ok(())
    }

    async fn build_index(
        profile: &Profile,
        provider: Option<&dyn EmbeddingProvider>,
    ) -> Result<Index, RetrievalError> {
        let snippets = extract_snippets(profile);
        Index::build(snippets, provider).await
    }

    /// Returns at most `top_k` snippets, best match first.
    ///
    /// Semantic ranking when embeddings are available; keyword-overlap
    /// ranking when they are not or when the query embedding fails at call
    /// time. An empty index yields an empty result, not an error.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<Snippet>, RetrievalError> {
        if top_k == 0 {
            return Err(RetrievalError::InvalidArgument(
                "top_k must be a positive integer".to_string(),
            ));
        }

        let index = self.index.load();
        if index.is_empty() {
            return Ok(Vec::new());
        }

        if index.has_embeddings() {
            if let Some(provider) = &self.provider {
                match provider.embed_query(query).await {
                    Ok(query_vec) if Some(query_vec.len()) == index.dimension() => {
                        let results: Vec<Snippet> = index
                            .rank_semantic(&query_vec)
                            .into_iter()
                            .take(top_k)
                            .cloned()
                            .collect();
                        info!("retrieved {} snippets via semantic ranking", results.len());
                        return Ok(results);
                    }
                    Ok(query_vec) => {
                        warn!(
                            "query embedding has {} dimensions, index has {:?}; \
                             falling back to keyword ranking",
                            query_vec.len(),
                            index.dimension()
                        );
                    }
                    Err(e) => {
                        error!(
                            "query embedding failed for {query:?}: {e}; \
                             falling back to keyword ranking"
                        );
                    }
                }
            }
        }

        let results = keyword_rank(index.snippets(), query, top_k);
        debug!("retrieved {} snippets via keyword fallback", results.len());
        Ok(results)
    }
}

/// Keyword-overlap ranking.
///
/// The query is lowercased and whitespace-tokenized; a snippet's score is
/// the number of query tokens contained in its lowercased content (each
/// token at most once per snippet, duplicate query tokens counted per
/// occurrence). Containment is plain substring matching, so "test" matches
/// "testing" — coarse, but downstream behavior depends on it.
pub fn keyword_rank(snippets: &[Snippet], query: &str, top_k: usize) -> Vec<Snippet> {
    let query_lower = query.to_lowercase();
    let tokens: Vec<&str> = query_lower.split_whitespace().collect();

    let mut scored: Vec<(usize, &Snippet)> = snippets
        .iter()
        .filter_map(|snippet| {
            let content = snippet.content.to_lowercase();
            let score = tokens.iter().filter(|t| content.contains(**t)).count();
            (score > 0).then_some((score, snippet))
        })
        .collect();

    // Stable sort: equal scores keep extraction order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(top_k)
        .map(|(_, s)| s.clone())
        .collect()
}
