//! Named collections loaded once at startup.
//!
//! A collection that fails to load is logged and remembered; only the
//! requests that need it are refused. Merged collections pair a sector's
//! own index with the default+sector document list.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use esrs_core::{CollectionLayout, Error, Result};
use esrs_infer::EmbedderBackend;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::index::{EmbeddingIndex, VectorIndex, ENUMERATE_ALL};
use crate::types::Document;

/// Default and sector documents alongside the sector's own index.
///
/// Only `index` is searched; `documents` is the concatenated list, default first.
pub struct MergedCollection {
    pub sector_label: String,
    pub index: Arc<dyn VectorIndex>,
    pub documents: Vec<Document>,
}

/// Load state of one collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionStatus {
    pub name: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// All collections of the deployment, immutable after construction.
pub struct IndexStore {
    layout: CollectionLayout,
    indexes: HashMap<String, Arc<dyn VectorIndex>>,
    failures: BTreeMap<String, String>,
    merged: HashMap<String, MergedCollection>,
}

impl IndexStore {
    /// Load every collection named by `layout` from `root/<collection>/`.
    pub fn load(root: &Path, layout: &CollectionLayout, embedder: Arc<dyn EmbedderBackend>) -> Self {
        let mut indexes: Vec<Arc<dyn VectorIndex>> = Vec::new();
        let mut failures = BTreeMap::new();

        for name in layout.all_collections() {
            match EmbeddingIndex::load(&root.join(name), name, embedder.clone()) {
                Ok(index) => {
                    if embedder.is_available() && embedder.dimension() != index.dimension() {
                        warn!(
                            "Collection {} has dimension {}, query embedder produces {}",
                            name,
                            index.dimension(),
                            embedder.dimension()
                        );
                    }
                    indexes.push(Arc::new(index));
                }
                Err(e) => {
                    error!("{}", e);
                    failures.insert(name.to_string(), e.to_string());
                }
            }
        }

        let mut store = Self::from_indexes(layout.clone(), indexes);
        store.failures = failures;
        store
    }

    /// Build a store from already loaded indexes, keyed by their names.
    pub fn from_indexes(layout: CollectionLayout, indexes: Vec<Arc<dyn VectorIndex>>) -> Self {
        let indexes = indexes
            .into_iter()
            .map(|index| (index.name().to_string(), index))
            .collect();

        let mut store = Self {
            layout,
            indexes,
            failures: BTreeMap::new(),
            merged: HashMap::new(),
        };
        store.build_merged();
        store
    }

    fn build_merged(&mut self) {
        let Some(default_index) = self.indexes.get(&self.layout.default).cloned() else {
            warn!("Default collection unavailable, no merged collections built");
            return;
        };

        for (label, collection) in &self.layout.sectors {
            let Some(sector_index) = self.indexes.get(collection).cloned() else {
                continue;
            };

            let listed = default_index
                .search("", ENUMERATE_ALL)
                .and_then(|default_docs| {
                    sector_index
                        .search("", ENUMERATE_ALL)
                        .map(|sector_docs| (default_docs, sector_docs))
                });

            match listed {
                Ok((default_docs, sector_docs)) => {
                    let documents: Vec<Document> = default_docs
                        .into_iter()
                        .chain(sector_docs)
                        .map(|hit| hit.document)
                        .collect();
                    info!(
                        "Merged collection for {}: {} documents",
                        label,
                        documents.len()
                    );
                    self.merged.insert(
                        label.clone(),
                        MergedCollection {
                            sector_label: label.clone(),
                            index: sector_index,
                            documents,
                        },
                    );
                }
                Err(e) => error!("Failed to enumerate documents for {}: {}", label, e),
            }
        }
    }

    pub fn layout(&self) -> &CollectionLayout {
        &self.layout
    }

    /// A loaded collection by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn VectorIndex>> {
        if let Some(index) = self.indexes.get(name) {
            return Ok(index.clone());
        }
        match self.failures.get(name) {
            Some(reason) => Err(Error::IndexUnavailable(format!("{name}: {reason}"))),
            None => Err(Error::IndexUnavailable(format!("{name}: not configured"))),
        }
    }

    /// Collection used to classify company descriptions.
    pub fn classification(&self) -> Result<Arc<dyn VectorIndex>> {
        self.get(&self.layout.classification)
    }

    /// Generic standards collection.
    pub fn default_index(&self) -> Result<Arc<dyn VectorIndex>> {
        self.get(&self.layout.default)
    }

    /// Merged collection of a special sector, if both sources loaded.
    pub fn merged(&self, sector_label: &str) -> Option<&MergedCollection> {
        self.merged.get(sector_label)
    }

    /// Whether every configured collection loaded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Load state of every configured collection, in layout order.
    pub fn status(&self) -> Vec<CollectionStatus> {
        self.layout
            .all_collections()
            .into_iter()
            .map(|name| match self.indexes.get(name) {
                Some(index) => CollectionStatus {
                    name: name.to_string(),
                    available: true,
                    documents: Some(index.len()),
                    error: None,
                },
                None => CollectionStatus {
                    name: name.to_string(),
                    available: false,
                    documents: None,
                    error: Some(
                        self.failures
                            .get(name)
                            .cloned()
                            .unwrap_or_else(|| "not loaded".into()),
                    ),
                },
            })
            .collect()
    }
}
