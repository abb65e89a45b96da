use async_trait::async_trait;
use log::info;
use reqwest::{Client as HttpClient, header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION}};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

use super::Retriever;
use crate::models::api::ChatResponse;
use crate::models::chat::SourceSnippet;

/// Connection settings for a managed cloud index.
#[derive(Clone, Debug)]
pub struct IndexConfig {
    pub name: String,
    pub project_name: String,
    pub organization_id: Option<String>,
    pub api_key: String,
    pub base_url: String,
}

#[derive(Deserialize)]
struct PipelineInfo {
    id: String,
    name: String,
}

#[derive(Serialize)]
struct RetrieveRequest<'a> {
    query: &'a str,
    dense_similarity_top_k: usize,
}

#[derive(Deserialize)]
struct RetrieveResponse {
    retrieval_nodes: Vec<RetrievedNode>,
}

#[derive(Deserialize)]
struct RetrievedNode {
    node: NodeContent,
    score: f64,
}

#[derive(Deserialize)]
struct NodeContent {
    text: String,
}

#[derive(Serialize)]
struct EngineRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct EngineResponse {
    response: String,
}

/// Retriever backed by a managed pipelines API. The pipeline id is resolved
/// once at connect time from the configured index name and project; every
/// request carries the API key as a bearer token.
pub struct CloudIndexRetriever {
    http: HttpClient,
    base_url: String,
    pipeline_id: String,
}

impl CloudIndexRetriever {
    pub async fn connect(config: IndexConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        if config.name.is_empty() {
            return Err("Index name is required".into());
        }
        if config.api_key.is_empty() {
            return Err("Managed index API key is required".into());
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .map_err(|e| format!("Invalid API key format: {}", e))?,
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        let base_url = config.base_url.trim_end_matches('/').to_string();

        let mut params = vec![
            ("pipeline_name".to_string(), config.name.clone()),
            ("project_name".to_string(), config.project_name.clone()),
        ];
        if let Some(org) = &config.organization_id {
            params.push(("organization_id".to_string(), org.clone()));
        }

        let pipelines = http.get(format!("{}/api/v1/pipelines", base_url))
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<PipelineInfo>>()
            .await?;

        let pipeline = pipelines.into_iter()
            .find(|p| p.name == config.name)
            .ok_or_else(|| {
                format!("Index '{}' not found in project '{}'", config.name, config.project_name)
            })?;

        info!("Index '{}' initialized (pipeline {})", config.name, pipeline.id);

        Ok(Self {
            http,
            base_url,
            pipeline_id: pipeline.id,
        })
    }
}

#[async_trait]
impl Retriever for CloudIndexRetriever {
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SourceSnippet>, Box<dyn StdError + Send + Sync>> {
        let url = format!("{}/api/v1/pipelines/{}/retrieve", self.base_url, self.pipeline_id);
        let req = RetrieveRequest {
            query,
            dense_similarity_top_k: top_k,
        };

        let resp = self.http.post(&url)
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json::<RetrieveResponse>()
            .await?;

        Ok(resp.retrieval_nodes.into_iter()
            .map(|n| SourceSnippet {
                content: n.node.text,
                score: n.score,
            })
            .collect())
    }

    async fn query(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<ChatResponse, Box<dyn StdError + Send + Sync>> {
        let sources = self.retrieve(query, top_k).await?;

        let url = format!("{}/api/v1/pipelines/{}/query", self.base_url, self.pipeline_id);
        let req = EngineRequest { query };

        let resp = self.http.post(&url)
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json::<EngineResponse>()
            .await?;

        Ok(ChatResponse {
            response: resp.response,
            sources,
        })
    }
}
