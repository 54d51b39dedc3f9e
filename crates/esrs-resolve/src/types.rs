//! Resolver types.

use esrs_store::Document;
use serde::Serialize;

/// Shortlist and final sizes of a two-stage retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetrievalParams {
    /// Candidates taken from vector search.
    pub coarse_k: usize,
    /// Candidates kept after reranking.
    pub fine_k: usize,
}

impl RetrievalParams {
    /// Industry-code classification.
    pub const CLASSIFICATION: Self = Self {
        coarse_k: 3,
        fine_k: 3,
    };

    /// Question answering.
    pub const ANSWERING: Self = Self {
        coarse_k: 10,
        fine_k: 5,
    };
}

/// A reranked document.
#[derive(Debug, Clone, Serialize)]
pub struct RankedDocument {
    pub document: Document,
    /// Relevance from the reranker; higher is more relevant.
    pub score: f32,
    /// Position in the coarse shortlist (0 = nearest).
    pub coarse_rank: usize,
    /// Vector distance from coarse search.
    pub distance: f32,
}

/// Join document texts with newlines to form a prompt context block.
pub fn context_block(documents: &[RankedDocument]) -> String {
    documents
        .iter()
        .map(|d| d.document.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
