pub mod cloud;

use async_trait::async_trait;
use std::error::Error as StdError;

use crate::models::api::ChatResponse;
use crate::models::chat::SourceSnippet;

/// Retrieval over a pre-indexed document corpus. Object safe so the agent
/// can hold any backend behind `Arc<dyn Retriever>`.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Returns at most `top_k` snippets, most relevant first, scores as
    /// reported by the backend.
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SourceSnippet>, Box<dyn StdError + Send + Sync>>;

    /// Full query-engine path: retrieval plus upstream answer synthesis,
    /// returning the answer and its supporting snippets together.
    async fn query(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<ChatResponse, Box<dyn StdError + Send + Sync>>;
}
