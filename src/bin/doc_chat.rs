//! Terminal front-end for the document retrieval gateway. Reads questions
//! from stdin, one per line, and prints the assistant reply with its
//! supporting sources.

use clap::Parser;
use doc_chat::models::chat::Role;
use doc_chat::{ ChatSession, QueryClient };
use dotenv::dotenv;
use std::error::Error;
use tokio::io::{ AsyncBufReadExt, AsyncWriteExt, BufReader };

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct ReplArgs {
    /// Base URL of the retrieval gateway.
    #[arg(long, env = "GATEWAY_URL", default_value = "http://127.0.0.1:8000")]
    gateway_url: String,

    /// Number of snippets to request per query.
    #[arg(long, env = "RETRIEVAL_TOP_K", default_value = "3")]
    top_k: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv::from_filename(".env.local").ok();
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = ReplArgs::parse();

    let client = QueryClient::new(args.gateway_url.clone(), Some(args.top_k));
    let mut session = ChatSession::new(client);

    println!("Document Chat");
    println!("Ask questions about your documents. Type :history for the transcript, Ctrl-D to exit.");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };

        if line.trim() == ":history" {
            print_history(&session);
            continue;
        }

        let reply = match session.submit(&line).await {
            Some(reply) => reply,
            None => continue,
        };

        println!("Assistant: {}", reply.content);
        if let Some(sources) = &reply.sources {
            if !sources.is_empty() {
                println!();
                println!("Sources:");
                for source in sources {
                    println!("  [{:.2}] {}", source.score, source.content);
                }
            }
        }
        println!();
    }

    Ok(())
}

fn print_history(session: &ChatSession) {
    for message in session.messages() {
        let who = match message.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        println!("{}: {}", who, preview(&message.content));
    }
}

/// Sidebar-style preview: the first 30 characters of the message.
fn preview(content: &str) -> String {
    let mut preview: String = content.chars().take(30).collect();
    if content.chars().count() > 30 {
        preview.push_str("...");
    }
    preview
}
