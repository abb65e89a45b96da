use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::sync::Arc;

const DEFAULT_SYNTHESIS_TEMPLATE: &str =
    "Context:\n{context}\n\nQuestion: {question}\nAnswer concisely using only the context. If unsure, say 'The documents don't contain this information'.";

/// Prompt templates for answer synthesis. The synthesis template must carry
/// the `{context}` and `{question}` placeholders.
#[derive(Deserialize, Debug, Clone)]
pub struct PromptConfig {
    pub synthesis: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            synthesis: DEFAULT_SYNTHESIS_TEMPLATE.to_string(),
        }
    }
}

pub fn load_prompts(path: &str) -> Result<Arc<PromptConfig>, Box<dyn Error + Send + Sync>> {
    let file_content = fs
        ::read_to_string(path)
        .map_err(|e| format!("Failed to read prompts file '{}': {}", path, e))?;
    let config: PromptConfig = serde_json
        ::from_str(&file_content)
        .map_err(|e| format!("Failed to parse prompts file '{}': {}", path, e))?;

    for placeholder in ["{context}", "{question}"] {
        if !config.synthesis.contains(placeholder) {
            return Err(
                format!("Synthesis template in '{}' is missing the {} placeholder", path, placeholder).into()
            );
        }
    }

    Ok(Arc::new(config))
}

pub fn get_synthesis_prompt(config: &PromptConfig, context: &str, question: &str) -> String {
    config.synthesis.replace("{context}", context).replace("{question}", question)
}
