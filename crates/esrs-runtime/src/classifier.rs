//! Industry-code classification of company descriptions.

use std::sync::Arc;

use esrs_chat::gateway::CompletionGateway;
use esrs_chat::prompts::classification_prompt;
use esrs_core::{Error, Result, AGNOSTIC};
use esrs_resolve::{context_block, RetrievalParams, Retriever, SectorTable};
use esrs_store::IndexStore;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use tracing::{info, warn};

/// A lone lowercase section letter, or one that starts a code-shaped token.
static LOWER_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([a-u])((?:\d{1,2}(?:\.\s*\d{1,2}){0,2})?)\b").expect("valid regex")
});

static DOT_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\s+").expect("valid regex"));

static NACE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-U]\d{1,2}(?:\.\d{1,2}){0,2}").expect("valid regex"));

/// Industry code and the special sector it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub industry_code: String,
    pub sector_label: String,
}

impl Classification {
    pub fn agnostic() -> Self {
        Self {
            industry_code: AGNOSTIC.to_string(),
            sector_label: AGNOSTIC.to_string(),
        }
    }

    pub fn is_agnostic(&self) -> bool {
        self.industry_code == AGNOSTIC
    }
}

/// Repair common formatting slips in a model's code answer.
///
/// `"the code is a1. 2"` becomes `"the code is A1.2"`.
pub fn normalize_response(raw: &str) -> String {
    let upper = LOWER_SECTION.replace_all(raw, |caps: &Captures| {
        format!("{}{}", caps[1].to_ascii_uppercase(), &caps[2])
    });
    DOT_SPACE.replace_all(&upper, ".").into_owned()
}

/// First industry code in normalized model output.
pub fn extract_code(normalized: &str) -> Option<&str> {
    NACE_CODE.find(normalized).map(|m| m.as_str())
}

/// Classifies descriptions against the classification collection.
pub struct NaceClassifier {
    store: Arc<IndexStore>,
    retriever: Arc<Retriever>,
    table: Arc<SectorTable>,
    gateway: Arc<dyn CompletionGateway>,
}

impl NaceClassifier {
    pub fn new(
        store: Arc<IndexStore>,
        retriever: Arc<Retriever>,
        table: Arc<SectorTable>,
        gateway: Arc<dyn CompletionGateway>,
    ) -> Self {
        Self {
            store,
            retriever,
            table,
            gateway,
        }
    }

    pub fn table(&self) -> &SectorTable {
        &self.table
    }

    /// Classify a company description.
    ///
    /// Gateway failures are returned to the caller. Model output without a
    /// recognizable code falls back to `Agnostic`.
    pub fn classify(&self, company_description: &str) -> Result<Classification> {
        if company_description.trim().is_empty() {
            return Err(Error::EmptyInput("company description"));
        }

        let index = self.store.classification()?;
        let ranked = self.retriever.retrieve(
            index.as_ref(),
            company_description,
            RetrievalParams::CLASSIFICATION,
        )?;
        let context = context_block(&ranked);

        let raw = self
            .gateway
            .complete(&classification_prompt(company_description, &context))?;

        Ok(self.resolve(&raw))
    }

    /// Map raw model output to a classification.
    pub fn resolve(&self, raw: &str) -> Classification {
        let normalized = normalize_response(raw);
        match extract_code(&normalized) {
            Some(code) => {
                let sector_label = self.table.label_for(code).to_string();
                info!("Company sector according to NACE: {} ({})", code, sector_label);
                Classification {
                    industry_code: code.to_string(),
                    sector_label,
                }
            }
            None => {
                warn!("Could not determine exact NACE code, using agnostic standards");
                Classification::agnostic()
            }
        }
    }
}
