//! Semantic snippet retrieval engine.
//!
//! Turns a candidate's structured profile into a flat index of experience
//! snippets and answers `retrieve(query, top_k)` with the snippets most
//! relevant to a job query. Ranking is semantic (embedding inner product)
//! when an embedding provider is configured and reachable, and degrades to
//! deterministic keyword-overlap ranking otherwise.
//!
//! Entry points: [`RetrievalEngine::from_profile`] to build an index from a
//! [`models::Profile`], then [`RetrievalEngine::retrieve`] to query it.

pub mod config;
pub mod embedding;
pub mod engine;
pub mod errors;
pub mod extractor;
pub mod index;
pub mod models;

pub use config::Config;
pub use embedding::{EmbeddingProvider, GeminiEmbeddingClient};
pub use engine::{RetrievalEngine, DEFAULT_TOP_K};
pub use errors::RetrievalError;
pub use index::{Index, SharedIndex};
pub use models::{Profile, Snippet};
