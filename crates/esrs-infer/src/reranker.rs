//! Pairwise relevance scoring used to rerank retrieved candidates.
//!
//! A cross-encoder reads the query and a passage together and emits a
//! single relevance logit; higher is more relevant. Scores are only
//! comparable between passages scored against the same query.

use std::collections::HashSet;

use esrs_core::Result;

/// Trait for query/passage relevance scorers.
pub trait RelevanceScorer: Send + Sync {
    /// Score one passage against a query. Model failures are `Error::Inference`.
    fn score(&self, query: &str, passage: &str) -> Result<f32>;

    /// Score several passages against the same query, preserving order.
    fn score_batch(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>> {
        passages.iter().map(|p| self.score(query, p)).collect()
    }

    /// Short name for logs and status output.
    fn name(&self) -> &str;
}

/// Fallback scorer: fraction of distinct query terms found in the passage.
///
/// Used when no cross-encoder model is installed.
pub struct LexicalScorer;

impl LexicalScorer {
    fn terms(text: &str) -> HashSet<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() > 2)
            .map(|t| t.to_lowercase())
            .collect()
    }
}

impl RelevanceScorer for LexicalScorer {
    fn score(&self, query: &str, passage: &str) -> Result<f32> {
        let query_terms = Self::terms(query);
        if query_terms.is_empty() {
            return Ok(0.0);
        }
        let passage_terms = Self::terms(passage);
        let matched = query_terms
            .iter()
            .filter(|t| passage_terms.contains(*t))
            .count();
        Ok(matched as f32 / query_terms.len() as f32)
    }

    fn name(&self) -> &str {
        "lexical"
    }
}
