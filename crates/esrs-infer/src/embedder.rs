//! Query embedding trait and the no-model fallback.
//!
//! Collections are embedded offline; at request time only the query text
//! needs an embedding, produced by the same model the collections were built with.

use ndarray::Array1;

/// Result of an embedding operation.
pub struct EmbeddingResult {
    /// Float32 embedding vector (384-dim for all-MiniLM-L6-v2).
    pub embedding: Array1<f32>,
    /// Whether this was served from cache.
    pub cached: bool,
}

/// Trait for embedding backends.
pub trait EmbedderBackend: Send + Sync {
    /// Generate an embedding for a text string.
    /// Returns None if the embedder is not available.
    fn embed(&self, text: &str) -> Option<EmbeddingResult>;

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;

    /// Check if the embedder is available (model loaded).
    fn is_available(&self) -> bool;
}

/// Placeholder embedder used when no model is installed. Text search is impossible with it.
pub struct NoopEmbedder {
    dim: usize,
}

impl NoopEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl EmbedderBackend for NoopEmbedder {
    fn embed(&self, _text: &str) -> Option<EmbeddingResult> {
        None
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn is_available(&self) -> bool {
        false
    }
}
