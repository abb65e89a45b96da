use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Managed Index Args ---
    /// Name of the managed index (pipeline) to query.
    #[arg(long, env = "INDEX_NAME", default_value = "")]
    pub index_name: String,

    /// Project the index belongs to.
    #[arg(long, env = "INDEX_PROJECT", default_value = "Default")]
    pub index_project: String,

    /// Organization id owning the project, for accounts with several.
    #[arg(long, env = "INDEX_ORG")]
    pub index_org: Option<String>,

    /// API key for the managed index service.
    #[arg(long, env = "LLAMA_CLOUD_API_KEY", default_value = "")]
    pub index_api_key: String,

    /// Base URL of the managed index service.
    #[arg(long, env = "INDEX_BASE_URL", default_value = "https://api.cloud.llamaindex.ai")]
    pub index_base_url: String,

    /// Default number of snippets to retrieve per query.
    #[arg(long, env = "RETRIEVAL_TOP_K", default_value = "3")]
    pub retrieval_top_k: usize,

    // --- Answer Args ---
    /// How answers are produced (engine, llm, retrieval).
    #[arg(long, env = "ANSWER_MODE", default_value = "engine")]
    pub answer_mode: String,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for answer synthesis (groq, ollama). Only used in llm answer mode.
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "groq")]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider
    #[arg(long, env = "CHAT_API_KEY", default_value = "")]
    pub chat_api_key: String,

    /// Model name for answer synthesis (e.g., mixtral-8x7b-32768, llama3)
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    // --- General App Args ---
    /// Optional path to a prompt file overriding the built-in synthesis template.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:8000")]
    pub server_addr: String,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
