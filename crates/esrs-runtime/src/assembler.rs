//! Answer assembly: route, retrieve, prompt, render, record.

use std::sync::Arc;

use esrs_chat::gateway::CompletionGateway;
use esrs_chat::prompts::answer_prompt;
use esrs_chat::render_markdown;
use esrs_core::{Error, Result};
use esrs_resolve::{context_block, RetrievalParams, Retriever, SectorRouter};
use esrs_store::IndexStore;
use serde::Serialize;
use tracing::{debug, error};

use crate::session::ConversationState;

/// Shown in place of an answer when the model cannot be reached.
pub const DEGRADED_ANSWER: &str =
    "I'm sorry, I couldn't generate an answer right now. Please try asking again.";

/// A rendered answer and the context it was grounded on.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// HTML rendering of the model's markdown, or the apology when degraded.
    pub html: String,
    /// Newline-joined texts of the reranked context documents.
    pub context: String,
    #[serde(skip)]
    pub degraded: bool,
}

pub struct ContextAssembler {
    router: SectorRouter,
    retriever: Arc<Retriever>,
    gateway: Arc<dyn CompletionGateway>,
}

impl ContextAssembler {
    pub fn new(
        store: Arc<IndexStore>,
        retriever: Arc<Retriever>,
        gateway: Arc<dyn CompletionGateway>,
    ) -> Self {
        Self {
            router: SectorRouter::new(store),
            retriever,
            gateway,
        }
    }

    /// Answer `question` for the session and append the turn to its transcript.
    ///
    /// A gateway failure yields a degraded answer and leaves `state` untouched.
    pub fn answer(&self, question: &str, state: &mut ConversationState) -> Result<Answer> {
        if question.trim().is_empty() {
            return Err(Error::EmptyInput("question"));
        }

        let index = self.router.select_collection(state.sector_label())?;
        let ranked = self
            .retriever
            .retrieve(index.as_ref(), question, RetrievalParams::ANSWERING)?;
        let context = context_block(&ranked);
        debug!(
            "Answering from {} with {} context documents",
            index.name(),
            ranked.len()
        );

        let prompt = answer_prompt(question, &context, &state.history);
        let raw = match self.gateway.complete(&prompt) {
            Ok(raw) => raw,
            Err(e) if e.is_recoverable() => {
                error!("Answer generation failed: {}", e);
                return Ok(Answer {
                    html: DEGRADED_ANSWER.to_string(),
                    context,
                    degraded: true,
                });
            }
            Err(e) => return Err(e),
        };

        let html = render_markdown(&raw);
        state.record_turn(question, &html);

        Ok(Answer {
            html,
            context,
            degraded: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classification;
    use crate::testing::*;

    fn oil_and_gas_state() -> ConversationState {
        let mut state = ConversationState::new();
        state.initialize(
            "We operate offshore oil drilling platforms",
            Classification {
                industry_code: "B06".into(),
                sector_label: "Oil & Gas Company".into(),
            },
        );
        state
    }

    #[test]
    fn test_oil_and_gas_answers_from_sector_index() {
        let fixture = Fixture::new(&["- Report **Scope 3** category 11"]);
        let mut state = oil_and_gas_state();

        let answer = fixture
            .assembler()
            .answer("What are Scope 3 emissions requirements?", &mut state)
            .unwrap();

        assert!(!answer.degraded);
        assert_eq!(
            answer.context,
            "Oil and gas undertakings shall disclose Scope 3 emissions from sold products"
        );
        assert!(answer.html.contains("<strong>Scope 3</strong>"));
        assert!(!answer.context.contains("ESRS E1"));
        assert_eq!(state.history.len(), 4);
        assert_eq!(state.history[2], "Q: What are Scope 3 emissions requirements?");
        assert_eq!(state.history[3], format!("A: {}", answer.html));
    }

    #[test]
    fn test_agnostic_answers_from_default_index() {
        let fixture = Fixture::new(&["Climate"]);
        let mut state = ConversationState::new();
        state.initialize("We bake bread", Classification::agnostic());

        let answer = fixture
            .assembler()
            .answer("Which standard covers climate change?", &mut state)
            .unwrap();
        assert_eq!(
            answer.context.lines().next(),
            Some("ESRS E1 covers climate change mitigation and adaptation")
        );
    }

    #[test]
    fn test_history_replayed_verbatim() {
        let responses: Vec<String> = (1..=6).map(|i| format!("answer {i}")).collect();
        let refs: Vec<&str> = responses.iter().map(String::as_str).collect();
        let fixture = Fixture::new(&refs);
        let assembler = fixture.assembler();
        let mut state = oil_and_gas_state();

        for turn in 1..=5 {
            assembler.answer(&format!("question {turn}"), &mut state).unwrap();
        }
        assert_eq!(state.history.len(), 12);
        assert_eq!(state.history[10], "Q: question 5");
        assert_eq!(state.history[11], "A: <p>answer 5</p>");

        assembler.answer("question 6", &mut state).unwrap();
        let sixth = fixture.gateway.prompts().pop().unwrap();
        let replay = sixth.split("Take into account the previous conversation:\n").nth(1).unwrap();
        let expected = state.history[..12].join("\n");
        assert!(replay.starts_with(&expected));
    }

    #[test]
    fn test_gateway_failure_degrades_without_recording() {
        let fixture = Fixture::failing();
        let mut state = oil_and_gas_state();
        let before = state.history.clone();

        let answer = fixture
            .assembler()
            .answer("What are Scope 3 emissions requirements?", &mut state)
            .unwrap();

        assert!(answer.degraded);
        assert_eq!(answer.html, DEGRADED_ANSWER);
        assert_eq!(state.history, before);
    }

    #[test]
    fn test_empty_question_rejected() {
        let fixture = Fixture::new(&["unused"]);
        let mut state = oil_and_gas_state();
        assert!(matches!(
            fixture.assembler().answer("", &mut state),
            Err(Error::EmptyInput(_))
        ));
        assert_eq!(state.history.len(), 2);
    }
}
