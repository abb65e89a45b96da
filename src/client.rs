use log::debug;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use thiserror::Error;

use crate::models::api::ChatRequest;
use crate::models::chat::SourceSnippet;

const NO_RESULTS_FALLBACK: &str = "No results found";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The query was empty after trimming; nothing was sent.
    #[error("query is empty")]
    EmptyQuery,
    /// The single request attempt failed: connection, non-success status,
    /// or an undecodable reply body.
    #[error("request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Outcome of a successful round trip. `sources` is None when the reply
/// carried no sources field at all, Some (possibly empty) when it did.
#[derive(Clone, Debug)]
pub struct QueryReply {
    pub response: String,
    pub sources: Option<Vec<SourceSnippet>>,
}

/// Wire shape of the gateway reply, decoded leniently so replies missing
/// either field still render.
#[derive(Deserialize)]
struct RawReply {
    response: Option<String>,
    sources: Option<Vec<SourceSnippet>>,
}

/// Client for the gateway's POST /api/chat endpoint. One request per call,
/// no retries, no streaming.
pub struct QueryClient {
    http: HttpClient,
    base_url: String,
    top_k: Option<usize>,
}

impl QueryClient {
    pub fn new(base_url: String, top_k: Option<usize>) -> Self {
        Self {
            http: HttpClient::new(),
            base_url,
            top_k,
        }
    }

    /// Submits one query and decodes the reply. Whitespace-only queries are
    /// rejected locally without touching the network.
    pub async fn send(&self, query: &str) -> Result<QueryReply, ClientError> {
        if query.trim().is_empty() {
            return Err(ClientError::EmptyQuery);
        }

        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));
        let req = ChatRequest {
            message: query.to_string(),
            top_k: self.top_k,
        };

        debug!("Sending query to {}", url);

        let raw = self.http.post(&url)
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json::<RawReply>()
            .await?;

        Ok(QueryReply {
            response: raw.response.unwrap_or_else(|| NO_RESULTS_FALLBACK.to_string()),
            sources: raw.sources,
        })
    }
}
