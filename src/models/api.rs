use serde::{ Serialize, Deserialize };

use crate::models::chat::SourceSnippet;

/// Request body for POST /api/chat.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// How many snippets to retrieve. When absent the gateway applies its
    /// configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

/// Response body for POST /api/chat. The sources list is always present,
/// empty when retrieval found nothing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub sources: Vec<SourceSnippet>,
}
