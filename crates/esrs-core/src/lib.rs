//! ESRS Core: error taxonomy, configuration, collection layout.

pub mod config;
pub mod error;

pub use config::{CollectionLayout, DataPaths, EsrsConfig, AGNOSTIC, MAX_SESSION_TTL_MINUTES};
pub use error::{Error, Result};
