//! ESRS Store: pre-built embedding indexes, searched read-only at request time.

pub mod collections;
pub mod format;
pub mod index;
pub mod types;

pub use collections::{CollectionStatus, IndexStore, MergedCollection};
pub use index::{EmbeddingIndex, VectorIndex, ENUMERATE_ALL};
pub use types::*;
