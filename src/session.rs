use chrono::Utc;
use log::warn;
use uuid::Uuid;

use crate::client::QueryClient;
use crate::models::chat::{ChatMessage, Conversation, Role, SourceSnippet};

const REQUEST_ERROR_MESSAGE: &str = "Error processing your request";

/// Client-side conversation state. Owns the message sequence and the query
/// client; messages are only ever appended, never mutated or removed. The
/// exclusive borrow on `submit` keeps at most one request in flight per
/// session.
pub struct ChatSession {
    client: QueryClient,
    conversation: Conversation,
    next_id: i64,
}

impl ChatSession {
    pub fn new(client: QueryClient) -> Self {
        Self {
            client,
            conversation: Conversation {
                id: Uuid::new_v4().to_string(),
                messages: Vec::new(),
            },
            // Seeded from wall clock so ids read as creation time, stepped
            // per message so they stay unique and increasing.
            next_id: Utc::now().timestamp_millis() * 1000,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.conversation.messages
    }

    pub fn transcript(&self) -> &Conversation {
        &self.conversation
    }

    /// Runs one submission: append the user message, send the query, append
    /// the assistant reply, and return it. Whitespace-only input is a no-op
    /// with no network activity. A failed request still appends an assistant
    /// message carrying a fixed error text, so the sequence always grows by
    /// exactly two per accepted submission.
    pub async fn submit(&mut self, input: &str) -> Option<&ChatMessage> {
        if input.trim().is_empty() {
            return None;
        }

        self.push(Role::User, input.to_string(), None);

        let (content, sources) = match self.client.send(input).await {
            Ok(reply) => (reply.response, reply.sources),
            Err(e) => {
                warn!("Query failed: {}", e);
                (REQUEST_ERROR_MESSAGE.to_string(), None)
            }
        };

        self.push(Role::Assistant, content, sources);
        self.conversation.messages.last()
    }

    fn push(&mut self, role: Role, content: String, sources: Option<Vec<SourceSnippet>>) {
        let id = self.next_id.to_string();
        self.next_id += 1;
        self.conversation.messages.push(ChatMessage {
            id,
            role,
            content,
            sources,
            timestamp: Utc::now().timestamp_millis(),
        });
    }
}
