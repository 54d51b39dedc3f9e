//! Chat types: providers, messages, generation parameters.

use serde::{Deserialize, Serialize};

/// LLM provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    Nvidia,
    OpenAI,
    Groq,
    Anthropic,
}

impl LLMProvider {
    /// Chat completions endpoint. All but Anthropic speak the OpenAI format.
    pub fn endpoint(&self) -> &'static str {
        match self {
            LLMProvider::Nvidia => "https://integrate.api.nvidia.com/v1/chat/completions",
            LLMProvider::OpenAI => "https://api.openai.com/v1/chat/completions",
            LLMProvider::Groq => "https://api.groq.com/openai/v1/chat/completions",
            LLMProvider::Anthropic => "https://api.anthropic.com/v1/messages",
        }
    }
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::Nvidia => write!(f, "nvidia"),
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Groq => write!(f, "groq"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Chat message sent to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// System instruction sent with every completion.
pub const BREVITY_INSTRUCTION: &str = "Be brief. \
Only return the most COMPLETE and accurate answer. \
Avoid explanations, introductions, and additional context. \
No need to introduce a summary at the end. ";

/// Fixed sampling parameters for every completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f64,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub max_tokens: usize,
    pub system_instruction: String,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.1,
            frequency_penalty: 0.1,
            presence_penalty: 0.0,
            max_tokens: 112_000,
            system_instruction: BREVITY_INSTRUCTION.to_string(),
        }
    }
}

/// Provider, model and key chosen for completions.
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub provider: LLMProvider,
    pub model: String,
    pub api_key: String,
}

/// LLM status (keys masked).
#[derive(Debug, Clone, Serialize)]
pub struct LLMStatus {
    #[serde(rename = "preferredProvider")]
    pub preferred_provider: String,
    #[serde(rename = "activeProvider")]
    pub active_provider: Option<String>,
    #[serde(rename = "activeModel")]
    pub active_model: Option<String>,
    #[serde(rename = "configuredProviders")]
    pub configured_providers: Vec<String>,
}
