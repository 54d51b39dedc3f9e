//! LLM configuration loading and provider selection.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::{GenerationParams, LLMProvider, LLMStatus, ResolvedProvider};

pub const DEFAULT_NVIDIA_MODEL: &str = "nvidia/llama-3.3-nemotron-super-49b-v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

/// Stored LLM configuration (`llm-config.json`). API keys fall back to env vars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    #[serde(default = "default_preferred")]
    pub preferred_provider: String,
    #[serde(default)]
    pub nvidia_api_key: Option<String>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub groq_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default = "default_nvidia_model")]
    pub nvidia_model: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    /// Fixed for every request; not read from the config file.
    #[serde(skip)]
    pub generation: GenerationParams,
}

fn default_preferred() -> String {
    "auto".into()
}
fn default_nvidia_model() -> String {
    DEFAULT_NVIDIA_MODEL.into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_groq_model() -> String {
    DEFAULT_GROQ_MODEL.into()
}
fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.into()
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            preferred_provider: default_preferred(),
            nvidia_api_key: None,
            openai_api_key: None,
            groq_api_key: None,
            anthropic_api_key: None,
            nvidia_model: default_nvidia_model(),
            openai_model: default_openai_model(),
            groq_model: default_groq_model(),
            anthropic_model: default_anthropic_model(),
            generation: GenerationParams::default(),
        }
    }
}

impl LLMConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        let mut config = match std::fs::read_to_string(config_path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(config) => {
                    info!("Loaded LLM config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring invalid {}: {}", config_path.display(), e);
                    LLMConfig::default()
                }
            },
            Err(_) => LLMConfig::default(),
        };

        config.fill_keys_from(|name| std::env::var(name).ok());
        config
    }

    /// Fill missing API keys from a variable lookup.
    pub fn fill_keys_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let slots = [
            (&mut self.nvidia_api_key, "NVIDIA_API_KEY"),
            (&mut self.openai_api_key, "OPENAI_API_KEY"),
            (&mut self.groq_api_key, "GROQ_API_KEY"),
            (&mut self.anthropic_api_key, "ANTHROPIC_API_KEY"),
        ];
        for (slot, var) in slots {
            if slot.is_none() {
                *slot = lookup(var).filter(|k| !k.is_empty());
            }
        }
    }

    fn provider_entry(&self, provider: LLMProvider) -> (Option<&String>, &String) {
        match provider {
            LLMProvider::Nvidia => (self.nvidia_api_key.as_ref(), &self.nvidia_model),
            LLMProvider::OpenAI => (self.openai_api_key.as_ref(), &self.openai_model),
            LLMProvider::Groq => (self.groq_api_key.as_ref(), &self.groq_model),
            LLMProvider::Anthropic => (self.anthropic_api_key.as_ref(), &self.anthropic_model),
        }
    }

    fn resolved(&self, provider: LLMProvider) -> Option<ResolvedProvider> {
        let (key, model) = self.provider_entry(provider);
        key.map(|k| ResolvedProvider {
            provider,
            model: model.clone(),
            api_key: k.clone(),
        })
    }

    /// Resolve which provider and model to use.
    pub fn resolve_provider(&self) -> Option<ResolvedProvider> {
        // Explicit preference
        if self.preferred_provider != "auto" {
            let provider = match self.preferred_provider.as_str() {
                "nvidia" => LLMProvider::Nvidia,
                "openai" => LLMProvider::OpenAI,
                "groq" => LLMProvider::Groq,
                "anthropic" => LLMProvider::Anthropic,
                _ => return None,
            };
            return self.resolved(provider);
        }

        // Auto mode: NVIDIA > Anthropic > Groq > OpenAI
        [
            LLMProvider::Nvidia,
            LLMProvider::Anthropic,
            LLMProvider::Groq,
            LLMProvider::OpenAI,
        ]
        .into_iter()
        .find_map(|p| self.resolved(p))
    }

    /// Public status, no API keys exposed.
    pub fn status(&self) -> LLMStatus {
        let resolved = self.resolve_provider();
        let configured_providers = [
            LLMProvider::Nvidia,
            LLMProvider::OpenAI,
            LLMProvider::Groq,
            LLMProvider::Anthropic,
        ]
        .into_iter()
        .filter(|p| self.provider_entry(*p).0.is_some())
        .map(|p| p.to_string())
        .collect();

        LLMStatus {
            preferred_provider: self.preferred_provider.clone(),
            active_provider: resolved.as_ref().map(|r| r.provider.to_string()),
            active_model: resolved.map(|r| r.model),
            configured_providers,
        }
    }
}
