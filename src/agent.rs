use crate::cli::Args;
use crate::config::prompt::{ self, PromptConfig };
use crate::llm::{ new_client, ChatClient, LlmConfig, LlmType };
use crate::models::api::ChatResponse;
use crate::models::chat::SourceSnippet;
use crate::retrieval::cloud::{ CloudIndexRetriever, IndexConfig };
use crate::retrieval::Retriever;

use log::{ info, warn };
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How the gateway turns retrieved snippets into an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMode {
    /// Delegate answer synthesis to the index's query engine.
    Engine,
    /// Retrieve, then synthesize locally with the configured chat LLM.
    Llm,
    /// No synthesis: the answer text is a formatted snippet dump.
    Retrieval,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseAnswerModeError {
    message: String,
}

impl fmt::Display for ParseAnswerModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ParseAnswerModeError {}

impl FromStr for AnswerMode {
    type Err = ParseAnswerModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "engine" => Ok(AnswerMode::Engine),
            "llm" => Ok(AnswerMode::Llm),
            "retrieval" => Ok(AnswerMode::Retrieval),
            _ =>
                Err(ParseAnswerModeError {
                    message: format!("Invalid answer mode: '{}'", s),
                }),
        }
    }
}

/// Produces one answer per request from the retrieval backend, according to
/// the configured answer mode.
#[derive(Clone)]
pub struct DocumentAgent {
    retriever: Arc<dyn Retriever>,
    chat_client: Option<Arc<dyn ChatClient>>,
    prompt_config: Arc<PromptConfig>,
    answer_mode: AnswerMode,
}

impl fmt::Debug for DocumentAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentAgent")
            .field("answer_mode", &self.answer_mode)
            .finish_non_exhaustive()
    }
}

impl DocumentAgent {
    async fn initialize_retriever(
        args: &Args
    ) -> Result<Arc<dyn Retriever>, Box<dyn Error + Send + Sync>> {
        info!(
            "Connecting to managed index '{}' (project '{}') at {}",
            args.index_name,
            args.index_project,
            args.index_base_url
        );
        let index_config = IndexConfig {
            name: args.index_name.clone(),
            project_name: args.index_project.clone(),
            organization_id: args.index_org.clone(),
            api_key: args.index_api_key.clone(),
            base_url: args.index_base_url.clone(),
        };
        let retriever = CloudIndexRetriever::connect(index_config).await?;
        Ok(Arc::new(retriever))
    }

    fn initialize_chat_client(
        args: &Args,
        answer_mode: AnswerMode
    ) -> Result<Option<Arc<dyn ChatClient>>, Box<dyn Error + Send + Sync>> {
        if answer_mode != AnswerMode::Llm {
            return Ok(None);
        }

        let llm_type = args.chat_llm_type.parse::<LlmType>()?;
        if llm_type.requires_api_key() && args.chat_api_key.is_empty() {
            warn!(
                "Chat LLM '{}' has no API key; synthesized answers disabled, falling back to retrieval output",
                args.chat_llm_type
            );
            return Ok(None);
        }

        let chat_api_key = if !args.chat_api_key.is_empty() {
            Some(args.chat_api_key.clone())
        } else {
            None
        };
        let chat_config = LlmConfig {
            llm_type,
            api_key: chat_api_key,
            model: args.chat_model.clone(),
            base_url: args.chat_base_url.clone(),
        };
        let chat_client = new_client(&chat_config)?;
        info!(
            "Chat client configured: Type={}, Model={:?}, BaseURL={:?}",
            args.chat_llm_type,
            chat_config.model.as_deref().unwrap_or("adapter default"),
            chat_config.base_url.as_deref().unwrap_or("adapter default")
        );

        Ok(Some(chat_client))
    }

    fn load_prompt_config(args: &Args) -> Result<Arc<PromptConfig>, Box<dyn Error + Send + Sync>> {
        match &args.prompts_path {
            Some(path) => prompt::load_prompts(path),
            None => Ok(Arc::new(PromptConfig::default())),
        }
    }

    pub async fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let answer_mode = args.answer_mode.parse::<AnswerMode>()?;
        let retriever = Self::initialize_retriever(args).await?;
        let chat_client = Self::initialize_chat_client(args, answer_mode)?;
        let prompt_config = Self::load_prompt_config(args)?;

        Ok(Self {
            retriever,
            chat_client,
            prompt_config,
            answer_mode,
        })
    }

    /// Answers one message. `top_k` bounds how many snippets retrieval
    /// returns; the snippets always travel back alongside the answer text.
    pub async fn answer(
        &self,
        message: &str,
        top_k: usize
    ) -> Result<ChatResponse, Box<dyn Error + Send + Sync>> {
        match self.answer_mode {
            AnswerMode::Engine => self.retriever.query(message, top_k).await,
            AnswerMode::Llm => {
                let sources = self.retriever.retrieve(message, top_k).await?;
                match &self.chat_client {
                    Some(chat_client) => {
                        let context = format_context_for_prompt(&sources);
                        let synthesis_prompt = prompt::get_synthesis_prompt(
                            &self.prompt_config,
                            &context,
                            message
                        );
                        let completion = chat_client.complete(&synthesis_prompt).await?;
                        Ok(ChatResponse {
                            response: completion.response,
                            sources,
                        })
                    }
                    None =>
                        Ok(ChatResponse {
                            response: format_retrieved_answer(&sources),
                            sources,
                        }),
                }
            }
            AnswerMode::Retrieval => {
                let sources = self.retriever.retrieve(message, top_k).await?;
                Ok(ChatResponse {
                    response: format_retrieved_answer(&sources),
                    sources,
                })
            }
        }
    }
}

/// Context block fed to the synthesis prompt, one numbered entry per snippet.
fn format_context_for_prompt(snippets: &[SourceSnippet]) -> String {
    if snippets.is_empty() {
        return "No relevant documents found.".to_string();
    }

    snippets
        .iter()
        .enumerate()
        .map(|(i, s)| format!("DOCUMENT {} (Score: {:.2}):\n{}", i + 1, s.score, s.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Answer text when no synthesis runs, a numbered dump of the snippets.
fn format_retrieved_answer(snippets: &[SourceSnippet]) -> String {
    if snippets.is_empty() {
        return "No relevant documents found.".to_string();
    }

    let mut answer = String::from("Retrieved information:\n\n");
    for (i, s) in snippets.iter().enumerate() {
        answer.push_str(
            &format!("--- Result {} (Score: {:.2}) ---\n{}\n\n", i + 1, s.score, s.content)
        );
    }
    answer
}
