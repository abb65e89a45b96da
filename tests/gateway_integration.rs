//! End-to-end tests for the retrieval gateway against an in-process fake
//! managed-index upstream.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Query;
use axum::response::IntoResponse;
use axum::routing::{ get, post };
use axum::Router;
use clap::Parser;
use doc_chat::agent::DocumentAgent;
use doc_chat::cli::Args;
use doc_chat::server::api::build_router;
use serde_json::{ json, Value };

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service()).await.unwrap();
    });
    addr
}

async fn list_pipelines(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let name = params.get("pipeline_name").cloned().unwrap_or_default();
    if name == "handbook" {
        axum::Json(json!([{ "id": "pl-1", "name": "handbook" }]))
    } else {
        axum::Json(json!([]))
    }
}

async fn retrieve(axum::Json(body): axum::Json<Value>) -> impl IntoResponse {
    let top_k = body["dense_similarity_top_k"].as_u64().unwrap_or(0) as usize;
    let nodes: Vec<Value> = (0..top_k)
        .map(|i|
            json!({
            "node": { "text": format!("Snippet {}", i + 1) },
            "score": 0.91 - (i as f64) * 0.07,
        })
        )
        .collect();
    axum::Json(json!({ "retrieval_nodes": nodes }))
}

async fn run_query(axum::Json(body): axum::Json<Value>) -> impl IntoResponse {
    let question = body["query"].as_str().unwrap_or("").to_string();
    axum::Json(json!({ "response": format!("Engine answer to: {}", question) }))
}

async fn echo_completion(axum::Json(body): axum::Json<Value>) -> impl IntoResponse {
    let prompt = body["messages"][0]["content"].as_str().unwrap_or("").to_string();
    axum::Json(
        json!({
        "choices": [{ "message": { "role": "assistant", "content": prompt } }]
    })
    )
}

async fn generate_completion(axum::Json(body): axum::Json<Value>) -> impl IntoResponse {
    let model = body["model"].as_str().unwrap_or("").to_string();
    axum::Json(json!({ "response": format!("{} says: answered", model) }))
}

fn upstream_router() -> Router {
    Router::new()
        .route("/api/v1/pipelines", get(list_pipelines))
        .route("/api/v1/pipelines/{id}/retrieve", post(retrieve))
        .route("/api/v1/pipelines/{id}/query", post(run_query))
        .route("/openai/v1/chat/completions", post(echo_completion))
        .route("/api/generate", post(generate_completion))
}

fn failing_upstream_router() -> Router {
    Router::new()
        .route("/api/v1/pipelines", get(list_pipelines))
        .route(
            "/api/v1/pipelines/{id}/retrieve",
            post(|| async { axum::http::StatusCode::INTERNAL_SERVER_ERROR })
        )
}

async fn spawn_gateway(upstream: SocketAddr, extra: Vec<String>) -> SocketAddr {
    let mut argv: Vec<String> = [
        "doc-chat-gateway",
        "--index-name",
        "handbook",
        "--index-api-key",
        "test-key",
        "--index-base-url",
    ]
        .iter()
        .map(|s| s.to_string())
        .collect();
    argv.push(format!("http://{}", upstream));
    argv.extend(extra);

    let args = Args::parse_from(argv);
    let agent = Arc::new(DocumentAgent::new(&args).await.expect("agent init"));
    spawn(build_router(agent, args.retrieval_top_k)).await
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let upstream = spawn(upstream_router()).await;
    let gateway = spawn_gateway(upstream, Vec::new()).await;

    let body: Value = reqwest
        ::get(format!("http://{}/health", gateway)).await
        .unwrap()
        .json().await
        .unwrap();

    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn chat_returns_engine_answer_with_top_k_sources() {
    let upstream = spawn(upstream_router()).await;
    let gateway = spawn_gateway(upstream, Vec::new()).await;

    let client = reqwest::Client::new();
    let body: Value = client
        .post(format!("http://{}/api/chat", gateway))
        .json(&json!({ "message": "What is the refund policy?" }))
        .send().await
        .unwrap()
        .json().await
        .unwrap();

    assert_eq!(body["response"], "Engine answer to: What is the refund policy?");
    let sources = body["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 3);
    assert_eq!(sources[0]["content"], "Snippet 1");
    assert_eq!(sources[0]["score"], 0.91);
    assert_eq!(sources[2]["content"], "Snippet 3");
}

#[tokio::test]
async fn request_top_k_overrides_the_configured_default() {
    let upstream = spawn(upstream_router()).await;
    let gateway = spawn_gateway(
        upstream,
        vec!["--retrieval-top-k".to_string(), "1".to_string()]
    ).await;

    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("http://{}/api/chat", gateway))
        .json(&json!({ "message": "q", "top_k": 2 }))
        .send().await
        .unwrap()
        .json().await
        .unwrap();
    assert_eq!(body["sources"].as_array().unwrap().len(), 2);

    let body: Value = client
        .post(format!("http://{}/api/chat", gateway))
        .json(&json!({ "message": "q" }))
        .send().await
        .unwrap()
        .json().await
        .unwrap();
    assert_eq!(body["sources"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn upstream_failure_is_reported_in_band() {
    let upstream = spawn(failing_upstream_router()).await;
    let gateway = spawn_gateway(upstream, Vec::new()).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{}/api/chat", gateway))
        .json(&json!({ "message": "q" }))
        .send().await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert!(
        body["response"].as_str().unwrap().starts_with("Error processing request:"),
        "unexpected response: {}",
        body["response"]
    );
    assert_eq!(body["sources"], json!([]));
}

#[tokio::test]
async fn retrieval_mode_answers_with_a_formatted_dump() {
    let upstream = spawn(upstream_router()).await;
    let gateway = spawn_gateway(
        upstream,
        vec!["--answer-mode".to_string(), "retrieval".to_string()]
    ).await;

    let client = reqwest::Client::new();
    let body: Value = client
        .post(format!("http://{}/api/chat", gateway))
        .json(&json!({ "message": "q" }))
        .send().await
        .unwrap()
        .json().await
        .unwrap();

    let answer = body["response"].as_str().unwrap();
    assert!(answer.starts_with("Retrieved information:\n\n"));
    assert!(answer.contains("--- Result 1 (Score: 0.91) ---\nSnippet 1"));
    assert!(answer.contains("--- Result 3 (Score: 0.77) ---\nSnippet 3"));
    assert_eq!(body["sources"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn llm_mode_fills_the_synthesis_prompt_from_retrieved_context() {
    let upstream = spawn(upstream_router()).await;
    let gateway = spawn_gateway(
        upstream,
        vec![
            "--answer-mode".to_string(),
            "llm".to_string(),
            "--chat-llm-type".to_string(),
            "groq".to_string(),
            "--chat-api-key".to_string(),
            "test-chat-key".to_string(),
            "--chat-base-url".to_string(),
            format!("http://{}", upstream)
        ]
    ).await;

    let client = reqwest::Client::new();
    let body: Value = client
        .post(format!("http://{}/api/chat", gateway))
        .json(&json!({ "message": "What is the refund policy?" }))
        .send().await
        .unwrap()
        .json().await
        .unwrap();

    // The fake completion endpoint echoes the prompt it was given.
    let prompt = body["response"].as_str().unwrap();
    assert!(prompt.starts_with("Context:\n"));
    assert!(prompt.contains("DOCUMENT 1 (Score: 0.91):\nSnippet 1"));
    assert!(prompt.contains("DOCUMENT 3 (Score: 0.77):\nSnippet 3"));
    assert!(prompt.contains("Question: What is the refund policy?"));
    assert!(prompt.contains("Answer concisely using only the context."));
    assert_eq!(body["sources"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn llm_mode_with_ollama_needs_no_api_key() {
    let upstream = spawn(upstream_router()).await;
    let gateway = spawn_gateway(
        upstream,
        vec![
            "--answer-mode".to_string(),
            "llm".to_string(),
            "--chat-llm-type".to_string(),
            "ollama".to_string(),
            "--chat-base-url".to_string(),
            format!("http://{}", upstream)
        ]
    ).await;

    let client = reqwest::Client::new();
    let body: Value = client
        .post(format!("http://{}/api/chat", gateway))
        .json(&json!({ "message": "q" }))
        .send().await
        .unwrap()
        .json().await
        .unwrap();

    // The fake generate endpoint reports the model it was asked for.
    assert_eq!(body["response"], "llama3 says: answered");
    assert_eq!(body["sources"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn llm_mode_without_a_key_falls_back_to_retrieval_output() {
    let upstream = spawn(upstream_router()).await;
    let gateway = spawn_gateway(
        upstream,
        vec!["--answer-mode".to_string(), "llm".to_string()]
    ).await;

    let client = reqwest::Client::new();
    let body: Value = client
        .post(format!("http://{}/api/chat", gateway))
        .json(&json!({ "message": "q" }))
        .send().await
        .unwrap()
        .json().await
        .unwrap();

    assert!(body["response"].as_str().unwrap().starts_with("Retrieved information:"));
}

#[tokio::test]
async fn missing_message_field_is_rejected() {
    let upstream = spawn(upstream_router()).await;
    let gateway = spawn_gateway(upstream, Vec::new()).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{}/api/chat", gateway))
        .json(&json!({ "top_k": 3 }))
        .send().await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn connect_fails_for_unknown_index() {
    let upstream = spawn(upstream_router()).await;
    let base_url = format!("http://{}", upstream);

    let args = Args::parse_from([
        "doc-chat-gateway",
        "--index-name",
        "missing",
        "--index-api-key",
        "test-key",
        "--index-base-url",
        base_url.as_str(),
    ]);
    let err = DocumentAgent::new(&args).await.unwrap_err();

    assert!(err.to_string().contains("'missing' not found"));
}
