//! Resolvers: sector-aware collection selection and two-stage retrieval.
//!
//! The cross-encoder only scores the coarse vector-search shortlist.

pub mod retriever;
pub mod router;
pub mod types;

pub use retriever::Retriever;
pub use router::{SectorRouter, SectorTable};
pub use types::*;
