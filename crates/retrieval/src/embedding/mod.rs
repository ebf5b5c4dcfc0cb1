//! Embedding Provider — the single point of entry for all embedding calls.
//!
//! The engine depends on the [`EmbeddingProvider`] trait so tests (and any
//! future backend) can swap in stubs; the shipped implementation is
//! [`GeminiEmbeddingClient`] over the Gemini REST API.
//!
//! Document and query embeddings use distinct task types (asymmetric
//! embedding): snippets are embedded once with `RETRIEVAL_DOCUMENT` at index
//! build, queries with `RETRIEVAL_QUERY` at retrieval time.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// The embedding model used for both document and query intents.
pub const EMBEDDING_MODEL: &str = "text-embedding-004";

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed embedding response: {0}")]
    MalformedResponse(String),
}

/// Text-to-vector provider with separate document and query intents.
///
/// `embed_documents` must issue a single batched request — one call per
/// snippet is a hard anti-pattern for latency and API cost. Returned vectors
/// must match the input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

impl TaskType {
    fn as_str(self) -> &'static str {
        match self {
            TaskType::RetrievalDocument => "RETRIEVAL_DOCUMENT",
            TaskType::RetrievalQuery => "RETRIEVAL_QUERY",
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbedPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct EmbedContent<'a> {
    parts: Vec<EmbedPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    model: &'a str,
    content: EmbedContent<'a>,
    task_type: &'a str,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

fn qualified_model() -> String {
    format!("models/{EMBEDDING_MODEL}")
}

fn embed_request<'a>(model: &'a str, text: &'a str, task_type: TaskType) -> EmbedRequest<'a> {
    EmbedRequest {
        model,
        content: EmbedContent {
            parts: vec![EmbedPart { text }],
        },
        task_type: task_type.as_str(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Gemini embedding client.
///
/// No internal retry: a failed round-trip is reported to the caller, which
/// degrades to keyword ranking. Retries, if wanted, belong in front of the
/// provider, not here.
#[derive(Clone)]
pub struct GeminiEmbeddingClient {
    client: Client,
    api_key: String,
}

impl GeminiEmbeddingClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    async fn post<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        body: &Req,
    ) -> Result<Resp, EmbeddingError> {
        let url = format!("{GEMINI_API_BASE}/models/{EMBEDDING_MODEL}:{endpoint}");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse the structured error message
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingClient {
    /// Embeds all snippet contents in one `batchEmbedContents` round-trip.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let model = qualified_model();
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|t| embed_request(&model, t, TaskType::RetrievalDocument))
                .collect(),
        };

        let response: BatchEmbedResponse = self.post("batchEmbedContents", &request).await?;

        debug!(
            "embedded {} documents ({} vectors returned)",
            texts.len(),
            response.embeddings.len()
        );

        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let model = qualified_model();
        let request = embed_request(&model, text, TaskType::RetrievalQuery);

        let response: EmbedResponse = self.post("embedContent", &request).await?;

        if response.embedding.values.is_empty() {
            return Err(EmbeddingError::MalformedResponse(
                "query embedding has no values".to_string(),
            ));
        }

        Ok(response.embedding.values)
    }
}
