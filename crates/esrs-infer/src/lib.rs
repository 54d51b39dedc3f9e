//! ESRS Infer: query embedding, cross-encoder relevance scoring, inference cache.
//!
//! With the `onnx` feature and model files present, `OnnxEmbedder` produces
//! MiniLM query embeddings and `OnnxCrossEncoder` scores query/passage pairs.
//! Without them, `NoopEmbedder` disables text search and `LexicalScorer`
//! stands in for the cross-encoder.

pub mod cache;
pub mod embedder;
pub mod onnx;
pub mod reranker;

pub use cache::InferenceCache;
pub use embedder::{EmbedderBackend, EmbeddingResult, NoopEmbedder};
pub use reranker::{LexicalScorer, RelevanceScorer};

#[cfg(feature = "onnx")]
pub use onnx::{OnnxCrossEncoder, OnnxEmbedder};

use std::path::Path;
use std::sync::Arc;

/// Create the best available query embedder for the given model directory.
///
/// Tries ONNX first (if feature enabled and model files present),
/// falls back to NoopEmbedder.
pub fn create_embedder(model_dir: &Path, dim: usize) -> Arc<dyn EmbedderBackend> {
    #[cfg(feature = "onnx")]
    {
        match OnnxEmbedder::load(model_dir) {
            Ok(embedder) => {
                tracing::info!("Using ONNX embedder (dim={})", embedder.dimension());
                return Arc::new(embedder);
            }
            Err(e) => {
                tracing::error!("ONNX embedder unavailable: {}. Text search disabled.", e);
            }
        }
    }

    #[cfg(not(feature = "onnx"))]
    {
        let _ = model_dir;
        tracing::warn!("ONNX feature disabled. Text search disabled.");
    }

    Arc::new(NoopEmbedder::new(dim))
}

/// Create the best available relevance scorer for the given model directory.
///
/// Tries the ONNX cross-encoder first, falls back to lexical overlap.
pub fn create_reranker(model_dir: &Path) -> Arc<dyn RelevanceScorer> {
    #[cfg(feature = "onnx")]
    {
        match OnnxCrossEncoder::load(model_dir) {
            Ok(scorer) => {
                tracing::info!("Using ONNX cross-encoder reranker");
                return Arc::new(scorer);
            }
            Err(e) => {
                tracing::warn!("Cross-encoder unavailable: {}. Falling back to lexical scoring.", e);
            }
        }
    }

    #[cfg(not(feature = "onnx"))]
    {
        let _ = model_dir;
        tracing::info!("ONNX feature disabled. Using lexical reranking.");
    }

    Arc::new(LexicalScorer)
}
