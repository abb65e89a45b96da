pub mod agent;
pub mod cli;
pub mod client;
pub mod config;
pub mod llm;
pub mod models;
pub mod retrieval;
pub mod server;
pub mod session;

pub use client::{ ClientError, QueryClient, QueryReply };
pub use session::ChatSession;

use agent::DocumentAgent;
use cli::Args;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Index Name: {}", args.index_name);
    info!("Index Project: {}", args.index_project);
    info!("Index Base URL: {}", args.index_base_url);
    info!("Answer Mode: {}", args.answer_mode);
    info!("Retrieval Top K: {}", args.retrieval_top_k);
    if args.answer_mode == "llm" {
        info!("Chat LLM Type: {}", args.chat_llm_type);
    }
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let agent = Arc::new(DocumentAgent::new(&args).await?);
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, agent, args);
    server.run().await?;

    Ok(())
}
