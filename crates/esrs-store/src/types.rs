//! Data types for documents, search results and the docstore sidecar.

use serde::{Deserialize, Serialize};

/// An immutable unit of retrievable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            metadata: None,
        }
    }

    /// Collection the document was built into, when recorded in metadata.
    pub fn collection(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("collection"))
            .and_then(|c| c.as_str())
    }
}

/// A search hit: document plus squared L2 distance to the query (smaller is nearer).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub distance: f32,
}

/// Index-building metadata stored in the sidecar. The binary file is authoritative.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexInfo {
    #[serde(default)]
    pub dimension: usize,
    #[serde(default)]
    pub count: usize,
    #[serde(default = "default_distance")]
    pub distance: String,
}

fn default_distance() -> String {
    "l2".into()
}

/// Contents of `docstore.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocStore {
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub embedding_model: Option<String>,
    pub documents: Vec<Document>,
    #[serde(default)]
    pub index: Option<IndexInfo>,
    /// Hex SHA-256 of `index.bin`, checked at load when present.
    #[serde(default)]
    pub index_sha256: Option<String>,
}
