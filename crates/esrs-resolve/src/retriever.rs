//! Two-stage retrieval: vector shortlist, then cross-encoder rerank.

use std::sync::Arc;

use esrs_core::Result;
use esrs_infer::RelevanceScorer;
use esrs_store::VectorIndex;
use tracing::debug;

use crate::types::{RankedDocument, RetrievalParams};

/// Retriever combining coarse vector search with pairwise reranking.
pub struct Retriever {
    scorer: Arc<dyn RelevanceScorer>,
}

impl Retriever {
    pub fn new(scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self { scorer }
    }

    /// Name of the reranking model.
    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    /// Retrieve up to `params.fine_k` documents for `query`, most relevant first.
    ///
    /// Equal reranker scores keep their coarse-search order.
    pub fn retrieve(
        &self,
        index: &dyn VectorIndex,
        query: &str,
        params: RetrievalParams,
    ) -> Result<Vec<RankedDocument>> {
        let candidates = index.search(query, params.coarse_k)?;

        let passages: Vec<&str> = candidates
            .iter()
            .map(|c| c.document.text.as_str())
            .collect();
        let scores = self.scorer.score_batch(query, &passages)?;

        let mut ranked: Vec<RankedDocument> = candidates
            .into_iter()
            .zip(scores)
            .enumerate()
            .map(|(coarse_rank, (hit, score))| RankedDocument {
                document: hit.document,
                score,
                coarse_rank,
                distance: hit.distance,
            })
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(params.fine_k);

        debug!(
            "Retrieved {} of {} candidates from {} (reranker={})",
            ranked.len(),
            params.coarse_k,
            index.name(),
            self.scorer.name()
        );
        Ok(ranked)
    }
}
