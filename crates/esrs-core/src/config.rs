//! Configuration and data directory management.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Label used for companies without a special sector, and for unresolved codes.
pub const AGNOSTIC: &str = "Agnostic";

/// Paths to all data consumed at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Pre-built collections, one directory each (`data/vectorstores/`).
    pub vectorstores: PathBuf,
    /// Query embedding model (`data/models/embedder/`).
    pub embedder_model: PathBuf,
    /// Cross-encoder relevance model (`data/models/reranker/`).
    pub reranker_model: PathBuf,
    /// Industry code → sector label table (`data/sector_classification.json`).
    pub sector_table: PathBuf,
    /// LLM configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
}

impl DataPaths {
    /// Resolve data paths under a root directory. Nothing is created; all inputs are read-only.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            vectorstores: root.join("vectorstores"),
            embedder_model: root.join("models").join("embedder"),
            reranker_model: root.join("models").join("reranker"),
            sector_table: root.join("sector_classification.json"),
            llm_config_file: root.join("llm-config.json"),
            root,
        }
    }
}

/// Directory names of the collections under `vectorstores/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionLayout {
    /// Collection searched to classify company descriptions.
    pub classification: String,
    /// Generic standards collection used for every company.
    pub default: String,
    /// Special sector label → dedicated collection.
    pub sectors: BTreeMap<String, String>,
}

impl Default for CollectionLayout {
    fn default() -> Self {
        let sectors = [
            ("Oil & Gas Company", "oil_gas_db"),
            ("Mining, Quarrying and Coal", "mining_db"),
            ("Road Transport", "road_db"),
        ]
        .into_iter()
        .map(|(label, dir)| (label.to_string(), dir.to_string()))
        .collect();

        Self {
            classification: "nace_db".into(),
            default: "default_db".into(),
            sectors,
        }
    }
}

impl CollectionLayout {
    /// All collection names, classification first, then default, then sectors.
    pub fn all_collections(&self) -> Vec<&str> {
        let mut names = vec![self.classification.as_str(), self.default.as_str()];
        names.extend(self.sectors.values().map(String::as_str));
        names
    }

    /// Collection dedicated to a special sector, if the label is one.
    pub fn sector_collection(&self, sector_label: &str) -> Option<&str> {
        self.sectors.get(sector_label).map(String::as_str)
    }
}

/// Top-level assistant configuration.
/// One year.
pub const MAX_SESSION_TTL_MINUTES: u64 = 60 * 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsrsConfig {
    /// HTTP server port.
    pub port: u16,
    /// Origin allowed to call the API with credentials.
    pub allowed_origin: String,
    /// Idle minutes before a conversation session expires.
    pub session_ttl_minutes: u64,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Collection directory names.
    pub collections: CollectionLayout,
    /// Embedding dimension (384 for all-MiniLM-L6-v2).
    pub embedding_dim: usize,
}

impl EsrsConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_lookup(data_dir, |name| std::env::var(name).ok())
    }

    /// Create configuration from a variable lookup. Set but unparsable values are errors.
    pub fn from_lookup(
        data_dir: impl AsRef<Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let port = parse_var(&lookup, "PORT", 5000)?;
        let session_ttl_minutes = parse_var(&lookup, "ESRS_SESSION_TTL_MINUTES", 120)?;
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&session_ttl_minutes) {
            return Err(Error::Config(format!(
                "ESRS_SESSION_TTL_MINUTES={session_ttl_minutes} is outside 1..={MAX_SESSION_TTL_MINUTES}"
            )));
        }
        let allowed_origin = lookup("ESRS_ALLOWED_ORIGIN")
            .unwrap_or_else(|| "http://localhost:5173".to_string());

        Ok(Self {
            port,
            allowed_origin,
            session_ttl_minutes,
            data_paths: DataPaths::new(data_dir),
            collections: CollectionLayout::default(),
            embedding_dim: 384,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T> {
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{name}={raw:?} is not a valid value"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_paths_layout() {
        let paths = DataPaths::new("/srv/esrs");
        assert_eq!(paths.vectorstores, PathBuf::from("/srv/esrs/vectorstores"));
        assert_eq!(
            paths.sector_table,
            PathBuf::from("/srv/esrs/sector_classification.json")
        );
        assert_eq!(
            paths.reranker_model,
            PathBuf::from("/srv/esrs/models/reranker")
        );
    }

    #[test]
    fn test_default_layout() {
        let layout = CollectionLayout::default();
        assert_eq!(layout.sector_collection("Oil & Gas Company"), Some("oil_gas_db"));
        assert_eq!(layout.sector_collection(AGNOSTIC), None);

        let all = layout.all_collections();
        assert_eq!(all[0], "nace_db");
        assert_eq!(all[1], "default_db");
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_env_defaults_and_overrides() {
        let config = EsrsConfig::from_lookup("/srv/esrs", |_| None).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.allowed_origin, "http://localhost:5173");
        assert_eq!(config.session_ttl_minutes, 120);

        let config = EsrsConfig::from_lookup("/srv/esrs", |name| match name {
            "PORT" => Some("8080".into()),
            "ESRS_SESSION_TTL_MINUTES" => Some(" 30 ".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_ttl_minutes, 30);
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let err = EsrsConfig::from_lookup("/srv/esrs", |name| {
            (name == "PORT").then(|| "http".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_session_ttl_out_of_range_is_config_error() {
        for raw in ["0", "525601", "18446744073709551615"] {
            let err = EsrsConfig::from_lookup("/srv/esrs", |name| {
                (name == "ESRS_SESSION_TTL_MINUTES").then(|| raw.to_string())
            })
            .unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{raw}");
        }

        let config = EsrsConfig::from_lookup("/srv/esrs", |name| {
            (name == "ESRS_SESSION_TTL_MINUTES").then(|| MAX_SESSION_TTL_MINUTES.to_string())
        })
        .unwrap();
        assert_eq!(config.session_ttl_minutes, MAX_SESSION_TTL_MINUTES);
    }
}
