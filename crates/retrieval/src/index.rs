//! Vector Index — snippets paired with their embeddings.
//!
//! `index.embeddings[i]` belongs to `index.snippets[i]`. The embeddings
//! sequence is empty exactly when the index operates in keyword-fallback
//! mode (no credential, or the batched embed call failed at build time).
//! An `Index` is read-only after construction; the only mutation path is
//! building a new one and swapping it in via [`SharedIndex`].

use std::sync::{Arc, RwLock};

use tracing::{error, info, warn};

use crate::embedding::EmbeddingProvider;
use crate::errors::RetrievalError;
use crate::models::Snippet;

/// Tolerance for the provider's unit-norm guarantee before re-normalizing.
const NORM_TOLERANCE: f32 = 1e-3;

#[derive(Debug)]
pub struct Index {
    snippets: Vec<Snippet>,
    embeddings: Vec<Vec<f32>>,
}

impl Index {
    /// Builds an index, batch-embedding every snippet in a single request.
    ///
    /// Provider absence or a failed batch call degrades to fallback mode
    /// (empty embeddings) with a log record. A provider that *answers* but
    /// returns the wrong number of vectors or mixed dimensionalities is a
    /// contract violation and fails construction.
    pub async fn build(
        snippets: Vec<Snippet>,
        provider: Option<&dyn EmbeddingProvider>,
    ) -> Result<Self, RetrievalError> {
        let provider = match provider {
            Some(p) => p,
            None => {
                warn!("no embedding credential configured; index will rank by keyword overlap");
                return Ok(Self {
                    snippets,
                    embeddings: Vec::new(),
                });
            }
        };

        if snippets.is_empty() {
            return Ok(Self {
                snippets,
                embeddings: Vec::new(),
            });
        }

        info!("generating embeddings for {} snippets", snippets.len());
        let texts: Vec<String> = snippets.iter().map(|s| s.content.clone()).collect();

        let embeddings = match provider.embed_documents(&texts).await {
            Ok(vectors) => vectors,
            Err(e) => {
                error!(
                    "batched embedding of {} snippets failed: {e}; falling back to keyword ranking",
                    snippets.len()
                );
                return Ok(Self {
                    snippets,
                    embeddings: Vec::new(),
                });
            }
        };

        let embeddings = validate_batch(embeddings, snippets.len())?;
        info!("semantic index initialized ({} vectors)", embeddings.len());

        Ok(Self {
            snippets,
            embeddings,
        })
    }

    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    /// False means fallback mode: no vectors were obtained at build time.
    pub fn has_embeddings(&self) -> bool {
        !self.embeddings.is_empty()
    }

    /// Shared dimensionality of the stored vectors; `None` in fallback mode.
    pub fn dimension(&self) -> Option<usize> {
        self.embeddings.first().map(Vec::len)
    }

    /// Ranks every snippet by inner product against the query vector,
    /// best first. Stable: equal scores keep extraction order.
    pub fn rank_semantic(&self, query_vec: &[f32]) -> Vec<&Snippet> {
        let mut scored: Vec<(f32, &Snippet)> = self
            .snippets
            .iter()
            .zip(&self.embeddings)
            .map(|(snippet, vec)| (dot(vec, query_vec), snippet))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().map(|(_, s)| s).collect()
    }
}

/// Checks the provider batch against the snippet count and the shared-
/// dimensionality invariant, re-normalizing vectors whose norm drifted.
fn validate_batch(
    embeddings: Vec<Vec<f32>>,
    expected: usize,
) -> Result<Vec<Vec<f32>>, RetrievalError> {
    if embeddings.len() != expected {
        return Err(RetrievalError::EmbeddingShape(format!(
            "provider returned {} vectors for {} snippets",
            embeddings.len(),
            expected
        )));
    }

    let dimension = embeddings[0].len();
    for (i, vec) in embeddings.iter().enumerate() {
        if vec.len() != dimension {
            return Err(RetrievalError::EmbeddingShape(format!(
                "vector {i} has {} dimensions, expected {dimension}",
                vec.len()
            )));
        }
    }

    Ok(embeddings.into_iter().map(normalize).collect())
}

/// Similarity is an inner product, which equals cosine similarity only for
/// unit vectors. The provider is expected to normalize; drift is corrected
/// here. Zero vectors are left alone (their similarity is 0 regardless).
fn normalize(vec: Vec<f32>) -> Vec<f32> {
    let norm = dot(&vec, &vec).sqrt();
    if norm == 0.0 || (norm - 1.0).abs() <= NORM_TOLERANCE {
        return vec;
    }
    vec.into_iter().map(|x| x / norm).collect()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

// ────────────────────────────────────────────────────────────────────────────
// SharedIndex — atomic swap for rebuilds
// ────────────────────────────────────────────────────────────────────────────

/// Clonable handle to an immutable index.
///
/// Readers take an `Arc` and never block each other; a rebuild swaps the
/// `Arc` atomically, so in-flight retrievals finish against the old index.
#[derive(Debug, Clone)]
pub struct SharedIndex {
    inner: Arc<RwLock<Arc<Index>>>,
}

impl SharedIndex {
    pub fn new(index: Index) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(index))),
        }
    }

    pub fn load(&self) -> Arc<Index> {
        // The guarded value is a plain Arc, so a poisoned lock cannot hold a
        // torn value; recover instead of propagating the panic.
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn swap(&self, index: Index) {
        let index = Arc::new(index);
        match self.inner.write() {
            Ok(mut guard) => *guard = index,
            Err(poisoned) => *poisoned.into_inner() = index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EmbeddingError, EmbeddingProvider};
    use async_trait::async_trait;
    use std::collections::HashMap;

    fn make_snippet(content: &str) -> Snippet {
        Snippet::new(content.to_string(), HashMap::new())
    }

    /// Stub returning a fixed vector batch regardless of input.
    struct FixedProvider {
        batch: Vec<Vec<f32>>,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedProvider {
        async fn embed_documents(&self, _: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(self.batch.clone())
        }

        async fn embed_query(&self, _: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![1.0, 0.0])
        }
    }

    /// Stub whose batch call always fails.
    struct FailingProvider;

    #[async_trait]
    impl EmbeddingProvider for FailingProvider {
        async fn embed_documents(&self, _: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Err(EmbeddingError::Api {
                status: 503,
                message: "unavailable".to_string(),
            })
        }

        async fn embed_query(&self, _: &str) -> Result<Vec<f32>, EmbeddingError> {
            Err(EmbeddingError::Api {
                status: 503,
                message: "unavailable".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_build_without_provider_is_fallback_mode() {
        let index = Index::build(vec![make_snippet("a")], None).await.unwrap();
        assert!(!index.has_embeddings());
        assert_eq!(index.len(), 1);
        assert_eq!(index.dimension(), None);
    }

    #[tokio::test]
    async fn test_build_with_failing_provider_degrades_not_errors() {
        let index = Index::build(vec![make_snippet("a")], Some(&FailingProvider))
            .await
            .unwrap();
        assert!(!index.has_embeddings());
    }

    #[tokio::test]
    async fn test_build_stores_one_vector_per_snippet() {
        let provider = FixedProvider {
            batch: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        };
        let index = Index::build(vec![make_snippet("a"), make_snippet("b")], Some(&provider))
            .await
            .unwrap();

        assert!(index.has_embeddings());
        assert_eq!(index.dimension(), Some(2));
    }

    #[tokio::test]
    async fn test_build_fails_loudly_on_count_mismatch() {
        let provider = FixedProvider {
            batch: vec![vec![1.0, 0.0]],
        };
        let err = Index::build(vec![make_snippet("a"), make_snippet("b")], Some(&provider))
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::EmbeddingShape(_)));
    }

    #[tokio::test]
    async fn test_build_fails_loudly_on_dimension_mismatch() {
        let provider = FixedProvider {
            batch: vec![vec![1.0, 0.0], vec![0.0, 1.0, 0.0]],
        };
        let err = Index::build(vec![make_snippet("a"), make_snippet("b")], Some(&provider))
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::EmbeddingShape(_)));
    }

    #[tokio::test]
    async fn test_empty_snippets_skip_embedding_call() {
        // FailingProvider would error if called; an empty profile must not
        // reach the provider at all.
        let index = Index::build(vec![], Some(&FailingProvider)).await.unwrap();
        assert!(index.is_empty());
        assert!(!index.has_embeddings());
    }

    #[tokio::test]
    async fn test_vectors_are_renormalized() {
        let provider = FixedProvider {
            batch: vec![vec![3.0, 4.0]],
        };
        let index = Index::build(vec![make_snippet("a")], Some(&provider))
            .await
            .unwrap();

        // Unit query along the first axis: similarity must be 3/5, not 3.
        let ranked_score = dot(&index.embeddings[0], &[1.0, 0.0]);
        assert!((ranked_score - 0.6).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_rank_semantic_orders_by_inner_product() {
        let provider = FixedProvider {
            batch: vec![vec![0.0, 1.0], vec![1.0, 0.0]],
        };
        let index = Index::build(
            vec![make_snippet("orthogonal"), make_snippet("aligned")],
            Some(&provider),
        )
        .await
        .unwrap();

        let ranked = index.rank_semantic(&[1.0, 0.0]);
        assert_eq!(ranked[0].content, "aligned");
        assert_eq!(ranked[1].content, "orthogonal");
    }

    #[tokio::test]
    async fn test_rank_semantic_ties_keep_extraction_order() {
        let provider = FixedProvider {
            batch: vec![vec![1.0, 0.0], vec![1.0, 0.0]],
        };
        let index = Index::build(vec![make_snippet("first"), make_snippet("second")], Some(&provider))
            .await
            .unwrap();

        let ranked = index.rank_semantic(&[0.0, 1.0]);
        assert_eq!(ranked[0].content, "first");
        assert_eq!(ranked[1].content, "second");
    }

    #[test]
    fn test_normalize_leaves_unit_and_zero_vectors() {
        assert_eq!(normalize(vec![1.0, 0.0]), vec![1.0, 0.0]);
        assert_eq!(normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_shared_index_swap_replaces_reference() {
        let old = Index::build(vec![make_snippet("old")], None).await.unwrap();
        let shared = SharedIndex::new(old);
        let held = shared.load();

        let new = Index::build(vec![make_snippet("new"), make_snippet("er")], None)
            .await
            .unwrap();
        shared.swap(new);

        // The held reference still sees the old index; fresh loads see the new.
        assert_eq!(held.len(), 1);
        assert_eq!(shared.load().len(), 2);
    }
}
