//! Nearest-neighbour search over one collection.

use std::path::Path;
use std::sync::Arc;

use esrs_core::{Error, Result};
use esrs_infer::EmbedderBackend;
use ndarray::{Array1, Array2, Axis};
use tracing::{debug, info};

use crate::format::read_collection;
use crate::types::{Document, ScoredDocument};

/// `k` that returns every document of any collection.
pub const ENUMERATE_ALL: usize = usize::MAX;

/// A searchable, immutable collection of documents.
pub trait VectorIndex: Send + Sync {
    /// Collection name.
    fn name(&self) -> &str;

    /// Number of documents.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Up to `k` documents nearest to `query`, nearest first.
    ///
    /// An empty query enumerates the collection in storage order.
    fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>>;
}

/// Exact squared-L2 index over pre-computed document embeddings.
pub struct EmbeddingIndex {
    name: String,
    documents: Vec<Document>,
    /// Document embeddings, shape (N, dim), row i belongs to `documents[i]`.
    vectors: Array2<f32>,
    /// Squared norm of each row.
    sq_norms: Array1<f32>,
    embedder: Arc<dyn EmbedderBackend>,
}

impl EmbeddingIndex {
    /// Load a collection from its directory (`index.bin` + `docstore.json`).
    pub fn load(dir: &Path, name: &str, embedder: Arc<dyn EmbedderBackend>) -> Result<Self> {
        let files = read_collection(dir, name)?;
        let index = Self::from_parts(name, files.docstore.documents, files.vectors, embedder)?;
        info!(
            "Loaded collection {}: {} documents, dim={}",
            name,
            index.len(),
            index.dimension()
        );
        Ok(index)
    }

    /// Build an index from documents and their embeddings, in the same order.
    pub fn from_parts(
        name: &str,
        documents: Vec<Document>,
        vectors: Array2<f32>,
        embedder: Arc<dyn EmbedderBackend>,
    ) -> Result<Self> {
        if documents.len() != vectors.nrows() {
            return Err(Error::IndexLoad {
                collection: name.to_string(),
                reason: format!(
                    "{} documents but {} vectors",
                    documents.len(),
                    vectors.nrows()
                ),
            });
        }

        let sq_norms = vectors.map_axis(Axis(1), |row| row.dot(&row));
        Ok(Self {
            name: name.to_string(),
            documents,
            vectors,
            sq_norms,
            embedder,
        })
    }

    /// Embedding dimension of the stored vectors.
    pub fn dimension(&self) -> usize {
        self.vectors.ncols()
    }

    /// All documents in storage order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Row indices and squared distances of the `k` rows nearest to `query`.
    ///
    /// Ties keep storage order.
    fn nearest(&self, query: &Array1<f32>, k: usize) -> Vec<(usize, f32)> {
        // ||v - q||^2 = ||v||^2 - 2 v.q + ||q||^2
        let q_sq = query.dot(query);
        let dots = self.vectors.dot(query);

        let mut ranked: Vec<(usize, f32)> = dots
            .iter()
            .zip(self.sq_norms.iter())
            .enumerate()
            .map(|(i, (&dot, &norm))| (i, (norm - 2.0 * dot + q_sq).max(0.0)))
            .collect();
        ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(k);
        ranked
    }
}

impl VectorIndex for EmbeddingIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.documents.len()
    }

    fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>> {
        if query.is_empty() {
            return Ok(self
                .documents
                .iter()
                .take(k)
                .map(|d| ScoredDocument {
                    document: d.clone(),
                    distance: 0.0,
                })
                .collect());
        }

        let result = self.embedder.embed(query).ok_or_else(|| {
            Error::Inference(format!("no query embedding available for {}", self.name))
        })?;

        if result.embedding.len() != self.dimension() {
            return Err(Error::Search(format!(
                "query embedding has dimension {}, collection {} has {}",
                result.embedding.len(),
                self.name,
                self.dimension()
            )));
        }

        let hits: Vec<ScoredDocument> = self
            .nearest(&result.embedding, k)
            .into_iter()
            .map(|(i, distance)| ScoredDocument {
                document: self.documents[i].clone(),
                distance,
            })
            .collect();

        debug!(
            "Searched {}: {} hits (k={}, cached_embedding={})",
            self.name,
            hits.len(),
            k,
            result.cached
        );
        Ok(hits)
    }
}
