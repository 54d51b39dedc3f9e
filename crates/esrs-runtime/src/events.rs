//! Conversation events for an external persistence layer.

use serde::Serialize;
use tracing::info;

/// A conversation was created or extended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    Created {
        industry_code: String,
        sector_label: String,
        title: String,
        company_description: String,
    },
    Turn {
        question: String,
        answer: String,
    },
}

const TITLE_CHARS: usize = 60;

impl ConversationEvent {
    pub fn created(company_description: &str, industry_code: &str, sector_label: &str) -> Self {
        ConversationEvent::Created {
            industry_code: industry_code.to_string(),
            sector_label: sector_label.to_string(),
            title: company_description.chars().take(TITLE_CHARS).collect(),
            company_description: company_description.to_string(),
        }
    }
}

/// Receives conversation events. Storage assigns identity and durability.
pub trait ConversationSink: Send + Sync {
    fn record(&self, session_id: &str, event: &ConversationEvent);
}

/// Discards every event.
pub struct NoopSink;

impl ConversationSink for NoopSink {
    fn record(&self, _session_id: &str, _event: &ConversationEvent) {}
}

/// Logs events as structured JSON.
pub struct TracingSink;

impl ConversationSink for TracingSink {
    fn record(&self, session_id: &str, event: &ConversationEvent) {
        match serde_json::to_string(event) {
            Ok(json) => info!(target: "esrs::conversation", session = session_id, "{}", json),
            Err(e) => tracing::warn!("Unserializable conversation event: {}", e),
        }
    }
}
