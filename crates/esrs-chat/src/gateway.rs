//! Completion gateway: one blocking chat completion per call.
//!
//! NVIDIA, OpenAI and Groq share the OpenAI chat format; Anthropic uses
//! the Messages API. No streaming, no retries, no client-side timeout.

use std::sync::Arc;

use esrs_core::{Error, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::config::LLMConfig;
use crate::types::{ChatMessage, GenerationParams, LLMProvider, ResolvedProvider};

/// Anthropic rejects output ceilings above its model limits.
const ANTHROPIC_MAX_TOKENS: usize = 8192;

/// Synchronous text completion.
pub trait CompletionGateway: Send + Sync {
    /// Complete `prompt` and return the trimmed model text.
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Model identifier for logs and status output.
    fn model(&self) -> &str;
}

/// Build the gateway for the configured provider, or one that always fails.
pub fn create_gateway(config: &LLMConfig) -> Arc<dyn CompletionGateway> {
    match config.resolve_provider() {
        Some(resolved) => {
            tracing::info!(
                "Completion gateway: provider={}, model={}",
                resolved.provider,
                resolved.model
            );
            Arc::new(HttpGateway::new(resolved, config.generation.clone()))
        }
        None => {
            tracing::warn!("No LLM provider configured; answers will degrade");
            Arc::new(UnconfiguredGateway)
        }
    }
}

/// HTTP gateway to a hosted chat model.
pub struct HttpGateway {
    resolved: ResolvedProvider,
    params: GenerationParams,
    // Built on first use: a blocking client must not be created on an async worker.
    client: OnceCell<Client>,
}

impl HttpGateway {
    pub fn new(resolved: ResolvedProvider, params: GenerationParams) -> Self {
        Self {
            resolved,
            params,
            client: OnceCell::new(),
        }
    }

    fn client(&self) -> Result<&Client> {
        self.client.get_or_try_init(|| {
            Client::builder()
                .timeout(None::<std::time::Duration>)
                .build()
                .map_err(|e| Error::Gateway(format!("Failed to build HTTP client: {e}")))
        })
    }

    fn messages(&self, prompt: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.params.system_instruction.clone()),
            ChatMessage::user(prompt),
        ]
    }

    /// Request body in the provider's format.
    fn request_body(&self, prompt: &str) -> Value {
        let messages = self.messages(prompt);
        match self.resolved.provider {
            LLMProvider::Anthropic => {
                let conversation: Vec<&ChatMessage> =
                    messages.iter().filter(|m| m.role != "system").collect();
                json!({
                    "model": self.resolved.model,
                    "system": self.params.system_instruction,
                    "messages": conversation,
                    "temperature": self.params.temperature,
                    "top_p": self.params.top_p,
                    "max_tokens": self.params.max_tokens.min(ANTHROPIC_MAX_TOKENS),
                    "stream": false,
                })
            }
            _ => json!({
                "model": self.resolved.model,
                "messages": messages,
                "temperature": self.params.temperature,
                "top_p": self.params.top_p,
                "max_tokens": self.params.max_tokens,
                "frequency_penalty": self.params.frequency_penalty,
                "presence_penalty": self.params.presence_penalty,
                "stream": false,
            }),
        }
    }

    fn send(&self, body: &Value) -> Result<Value> {
        let provider = self.resolved.provider;
        let request = self.client()?.post(provider.endpoint()).json(body);
        let request = match provider {
            LLMProvider::Anthropic => request
                .header("x-api-key", &self.resolved.api_key)
                .header("anthropic-version", "2023-06-01"),
            _ => request.bearer_auth(&self.resolved.api_key),
        };

        let response = request
            .send()
            .map_err(|e| Error::Gateway(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Gateway(format!("API error {status}: {body}")));
        }

        response
            .json()
            .map_err(|e| Error::Gateway(format!("Invalid response body: {e}")))
    }
}

/// Extract the completion text from a provider response.
pub fn extract_text(provider: LLMProvider, response: &Value) -> Result<String> {
    let text = match provider {
        LLMProvider::Anthropic => response["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b["type"] == "text")
                    .filter_map(|b| b["text"].as_str())
                    .collect::<String>()
            })
            .filter(|t| !t.is_empty()),
        _ => response["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string),
    };

    text.map(|t| t.trim().to_string())
        .ok_or_else(|| Error::Gateway("Response contained no completion text".into()))
}

impl CompletionGateway for HttpGateway {
    fn complete(&self, prompt: &str) -> Result<String> {
        debug!(
            "Completion request to {} ({} prompt chars)",
            self.resolved.model,
            prompt.len()
        );
        let body = self.request_body(prompt);
        let result = self
            .send(&body)
            .and_then(|response| extract_text(self.resolved.provider, &response));

        if let Err(e) = &result {
            error!("Completion via {} failed: {}", self.resolved.provider, e);
        }
        result
    }

    fn model(&self) -> &str {
        &self.resolved.model
    }
}

/// Gateway used when no provider has an API key.
pub struct UnconfiguredGateway;

impl CompletionGateway for UnconfiguredGateway {
    fn complete(&self, _prompt: &str) -> Result<String> {
        Err(Error::Gateway("No LLM provider configured".into()))
    }

    fn model(&self) -> &str {
        "none"
    }
}
