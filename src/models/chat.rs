use serde::{ Serialize, Deserialize };

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A retrieved passage supporting an assistant reply. The score is kept
/// exactly as retrieval reported it; rounding happens only at display time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceSnippet {
    pub content: String,
    pub score: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique within a session, increasing with insertion order.
    pub id: String,
    pub role: Role,
    pub content: String,
    /// None for user messages and failed replies; Some (possibly empty)
    /// when the reply carried a sources field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceSnippet>>,
    /// Unix epoch milliseconds at creation.
    pub timestamp: i64,
}

/// An append-only message sequence. Messages are never mutated or removed
/// once pushed; ordering is insertion order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub messages: Vec<ChatMessage>,
}
