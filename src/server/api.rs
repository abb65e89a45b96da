use crate::agent::DocumentAgent;
use crate::cli::Args;
use crate::models::api::{ChatRequest, ChatResponse};
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
    extract::State,
    response::IntoResponse,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use log::{info, error};

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Clone)]
struct AppState {
    agent: Arc<DocumentAgent>,
    default_top_k: usize,
}

/// Builds the gateway router. Standalone so tests can mount it on an
/// ephemeral port.
pub fn build_router(agent: Arc<DocumentAgent>, default_top_k: usize) -> Router {
    let app_state = AppState {
        agent,
        default_top_k,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(app_state)
}

pub async fn start_http_server(
    addr: &str,
    agent: Arc<DocumentAgent>,
    args: Args,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    info!("Starting HTTP API server on: http://{}", addr);

    let app = build_router(agent, args.retrieval_top_k);

    if args.enable_tls {
        let (cert_path, key_path) = match (&args.tls_cert_path, &args.tls_key_path) {
            (Some(cert), Some(key)) => (cert, key),
            _ => return Err("TLS is enabled but cert or key path is missing".into()),
        };

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
            cert_path,
            key_path
        ).await?;

        info!("HTTPS server started with TLS enabled");
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await?;
    } else {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}

/// Failures are reported in-band: the reply is still 200 with the error text
/// as the answer, so thin clients render it like any other assistant reply.
async fn chat_handler(
    State(state): State<AppState>,
    axum::Json(req): axum::Json<ChatRequest>,
) -> impl IntoResponse {
    let top_k = req.top_k.unwrap_or(state.default_top_k);

    match state.agent.answer(&req.message, top_k).await {
        Ok(resp) => axum::Json(resp),
        Err(e) => {
            error!("Chat request failed: {}", e);
            axum::Json(ChatResponse {
                response: format!("Error processing request: {}", e),
                sources: Vec::new(),
            })
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    axum::Json(HealthResponse {
        status: "healthy".to_string(),
    })
}
