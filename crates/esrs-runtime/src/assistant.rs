//! Session-level message handling.

use std::sync::Arc;

use esrs_core::Result;
use esrs_store::IndexStore;
use serde::Serialize;
use tracing::{error, info};

use crate::assembler::ContextAssembler;
use crate::classifier::NaceClassifier;
use crate::events::{ConversationEvent, ConversationSink};
use crate::session::ConversationState;

/// Shown when the company description could not be classified.
pub const DEGRADED_CLASSIFICATION: &str =
    "I'm sorry, I couldn't analyze your company description right now. Please send it again.";

/// Reply to one chat message.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub answer: String,
    pub context: String,
    pub is_first_message: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nace_sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub esrs_sector: Option<String>,
}

/// Classifies the first message of a session and answers the rest.
pub struct Assistant {
    classifier: NaceClassifier,
    assembler: ContextAssembler,
    sink: Arc<dyn ConversationSink>,
}

impl Assistant {
    pub fn new(
        classifier: NaceClassifier,
        assembler: ContextAssembler,
        sink: Arc<dyn ConversationSink>,
    ) -> Self {
        Self {
            classifier,
            assembler,
            sink,
        }
    }

    pub fn classifier(&self) -> &NaceClassifier {
        &self.classifier
    }

    /// Handle one message of session `session_id`.
    ///
    /// Returns `Err` only for empty input and missing collections; model
    /// failures come back as apologetic replies with the state unchanged.
    pub fn handle_message(
        &self,
        session_id: &str,
        state: &mut ConversationState,
        message: &str,
    ) -> Result<Reply> {
        if state.is_initialized() {
            self.answer(session_id, state, message)
        } else {
            self.introduce(session_id, state, message)
        }
    }

    fn introduce(
        &self,
        session_id: &str,
        state: &mut ConversationState,
        company_description: &str,
    ) -> Result<Reply> {
        let classification = match self.classifier.classify(company_description) {
            Ok(c) => c,
            Err(e) if e.is_recoverable() => {
                error!("Classification failed for session {}: {}", session_id, e);
                return Ok(Reply {
                    answer: DEGRADED_CLASSIFICATION.to_string(),
                    context: String::new(),
                    is_first_message: true,
                    nace_sector: None,
                    esrs_sector: None,
                });
            }
            Err(e) => return Err(e),
        };

        info!(
            "Session {} classified as {} ({})",
            session_id, classification.industry_code, classification.sector_label
        );
        self.sink.record(
            session_id,
            &ConversationEvent::created(
                company_description,
                &classification.industry_code,
                &classification.sector_label,
            ),
        );

        let reply = Reply {
            answer: format!(
                "Thank you for your company description. Based on my analysis, your company \
                 falls under NACE sector {}. How can I help you with your ESRS reporting \
                 requirements?",
                classification.industry_code
            ),
            context: String::new(),
            is_first_message: true,
            nace_sector: Some(classification.industry_code.clone()),
            esrs_sector: Some(classification.sector_label.clone()),
        };
        state.initialize(company_description, classification);
        Ok(reply)
    }

    fn answer(
        &self,
        session_id: &str,
        state: &mut ConversationState,
        question: &str,
    ) -> Result<Reply> {
        let answer = self.assembler.answer(question, state)?;
        if !answer.degraded {
            self.sink.record(
                session_id,
                &ConversationEvent::Turn {
                    question: question.to_string(),
                    answer: answer.html.clone(),
                },
            );
        }

        Ok(Reply {
            answer: answer.html,
            context: answer.context,
            is_first_message: false,
            nace_sector: None,
            esrs_sector: None,
        })
    }
}

/// Build an assistant over loaded collections.
pub fn build_assistant(
    store: Arc<IndexStore>,
    retriever: Arc<esrs_resolve::Retriever>,
    table: Arc<esrs_resolve::SectorTable>,
    gateway: Arc<dyn esrs_chat::gateway::CompletionGateway>,
    sink: Arc<dyn ConversationSink>,
) -> Assistant {
    let classifier = NaceClassifier::new(store.clone(), retriever.clone(), table, gateway.clone());
    let assembler = ContextAssembler::new(store, retriever, gateway);
    Assistant::new(classifier, assembler, sink)
}
