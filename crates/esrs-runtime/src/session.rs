//! Per-session conversation state.

use esrs_core::AGNOSTIC;
use serde::{Deserialize, Serialize};

use crate::classifier::Classification;

/// What the first message established about the company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_description: String,
    pub industry_code: String,
    pub sector_label: String,
}

impl CompanyProfile {
    /// Transcript line naming the standards that apply.
    pub fn standards_line(&self) -> String {
        if self.sector_label == AGNOSTIC {
            "ESRS standards to follow: Agnostic Standards".to_string()
        } else {
            format!(
                "ESRS standards to follow: Agnostic Standards + {}",
                self.sector_label
            )
        }
    }
}

/// Conversation of one session. Uninitialized until a description is classified.
///
/// `history` is append-only and replayed in full into every answer prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    pub profile: Option<CompanyProfile>,
    pub history: Vec<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.profile.is_some()
    }

    /// Sector label of the session, `Agnostic` before classification.
    pub fn sector_label(&self) -> &str {
        self.profile
            .as_ref()
            .map(|p| p.sector_label.as_str())
            .unwrap_or(AGNOSTIC)
    }

    pub fn industry_code(&self) -> Option<&str> {
        self.profile.as_ref().map(|p| p.industry_code.as_str())
    }

    /// Record the classified description and seed the transcript.
    pub fn initialize(&mut self, company_description: &str, classification: Classification) {
        let profile = CompanyProfile {
            company_description: company_description.to_string(),
            industry_code: classification.industry_code,
            sector_label: classification.sector_label,
        };
        self.history = vec![
            format!("Company description: {company_description}"),
            profile.standards_line(),
        ];
        self.profile = Some(profile);
    }

    /// Append one question and its rendered answer.
    pub fn record_turn(&mut self, question: &str, rendered_answer: &str) {
        self.history.push(format!("Q: {question}"));
        self.history.push(format!("A: {rendered_answer}"));
    }

    pub fn clear(&mut self) {
        self.profile = None;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(code: &str, label: &str) -> Classification {
        Classification {
            industry_code: code.into(),
            sector_label: label.into(),
        }
    }

    #[test]
    fn test_initialize_seeds_transcript() {
        let mut state = ConversationState::new();
        assert!(!state.is_initialized());
        assert_eq!(state.sector_label(), AGNOSTIC);

        state.initialize("We run trucks", classification("H49.4", "Road Transport"));
        assert!(state.is_initialized());
        assert_eq!(state.industry_code(), Some("H49.4"));
        assert_eq!(
            state.history,
            vec![
                "Company description: We run trucks",
                "ESRS standards to follow: Agnostic Standards + Road Transport",
            ]
        );
    }

    #[test]
    fn test_agnostic_standards_line() {
        let mut state = ConversationState::new();
        state.initialize("We bake bread", Classification::agnostic());
        assert_eq!(state.history[1], "ESRS standards to follow: Agnostic Standards");
    }

    #[test]
    fn test_turns_append_in_order() {
        let mut state = ConversationState::new();
        state.initialize("desc", Classification::agnostic());
        state.record_turn("first?", "<p>one</p>");
        state.record_turn("second?", "<p>two</p>");
        assert_eq!(&state.history[2..], ["Q: first?", "A: <p>one</p>", "Q: second?", "A: <p>two</p>"]);

        state.clear();
        assert!(!state.is_initialized());
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_state_serializes() {
        let mut state = ConversationState::new();
        state.initialize("desc", classification("B06", "Oil & Gas Company"));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["profile"]["industry_code"], "B06");
        let back: ConversationState = serde_json::from_value(json).unwrap();
        assert_eq!(back.history, state.history);
    }
}
