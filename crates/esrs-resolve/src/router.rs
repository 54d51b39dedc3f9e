//! Sector routing: industry code → sector label → answering collection.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use esrs_core::{Error, Result, AGNOSTIC};
use esrs_store::{IndexStore, VectorIndex};
use tracing::info;

/// Static industry code → special sector label table.
///
/// Codes absent from the table belong to no special sector.
#[derive(Debug, Clone, Default)]
pub struct SectorTable {
    sectors: HashMap<String, String>,
}

impl SectorTable {
    /// Load the table from a JSON object of code → label strings.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::ClassificationTable(format!("{}: {e}", path.display())))?;
        let table = Self::from_json(&raw)?;
        info!(
            "Sector classification table loaded: {} codes from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse the table from JSON text.
    pub fn from_json(raw: &str) -> Result<Self> {
        let sectors: HashMap<String, String> = serde_json::from_str(raw)
            .map_err(|e| Error::ClassificationTable(format!("expected code → label object: {e}")))?;
        Ok(Self { sectors })
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            sectors: pairs
                .into_iter()
                .map(|(code, label)| (code.to_string(), label.to_string()))
                .collect(),
        }
    }

    /// Sector label of an industry code, `"Agnostic"` when absent.
    pub fn label_for(&self, code: &str) -> &str {
        self.sectors.get(code).map(String::as_str).unwrap_or(AGNOSTIC)
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

/// Selects the collection that answers questions for a sector.
pub struct SectorRouter {
    store: Arc<IndexStore>,
}

impl SectorRouter {
    pub fn new(store: Arc<IndexStore>) -> Self {
        Self { store }
    }

    /// Whether the label names a sector with a dedicated collection.
    pub fn is_special_sector(&self, sector_label: &str) -> bool {
        self.store.layout().sector_collection(sector_label).is_some()
    }

    /// The sector's dedicated index for special sectors, else the default index.
    ///
    /// The merged default+sector document list is never what gets searched here.
    pub fn select_collection(&self, sector_label: &str) -> Result<Arc<dyn VectorIndex>> {
        match self.store.layout().sector_collection(sector_label) {
            Some(collection) => self.store.get(collection),
            None => self.store.default_index(),
        }
    }
}
