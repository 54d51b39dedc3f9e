//! On-disk collection format.
//!
//! Each collection directory holds two files:
//! - `index.bin`: magic `ESRSIDX1`, u32 dimension, u64 count, then
//!   `count * dimension` little-endian f32 values, one row per document.
//! - `docstore.json`: document payloads in row order plus build metadata.
//!
//! Both must be present and agree on the document count. The binary header
//! overrides whatever index metadata the sidecar carries.

use std::path::Path;

use esrs_core::{Error, Result};
use ndarray::Array2;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::types::{DocStore, IndexInfo};

pub const INDEX_FILE: &str = "index.bin";
pub const DOCSTORE_FILE: &str = "docstore.json";

const MAGIC: &[u8; 8] = b"ESRSIDX1";
const HEADER_LEN: usize = 8 + 4 + 8;

/// A decoded collection: vectors and the sidecar they belong to.
pub struct CollectionFiles {
    pub vectors: Array2<f32>,
    pub docstore: DocStore,
}

fn load_error(collection: &str, reason: impl Into<String>) -> Error {
    Error::IndexLoad {
        collection: collection.to_string(),
        reason: reason.into(),
    }
}

/// Encode a vector matrix in the `index.bin` layout.
pub fn encode_vectors(vectors: &Array2<f32>) -> Vec<u8> {
    let (count, dim) = vectors.dim();
    let mut bytes = Vec::with_capacity(HEADER_LEN + count * dim * 4);
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&(dim as u32).to_le_bytes());
    bytes.extend_from_slice(&(count as u64).to_le_bytes());
    for v in vectors.iter() {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode an `index.bin` payload.
pub fn decode_vectors(collection: &str, bytes: &[u8]) -> Result<Array2<f32>> {
    if bytes.len() < HEADER_LEN || &bytes[..8] != MAGIC {
        return Err(load_error(collection, "index.bin has no ESRSIDX1 header"));
    }

    let mut dim_bytes = [0u8; 4];
    dim_bytes.copy_from_slice(&bytes[8..12]);
    let mut count_bytes = [0u8; 8];
    count_bytes.copy_from_slice(&bytes[12..20]);
    let dim = u32::from_le_bytes(dim_bytes) as usize;
    let count = u64::from_le_bytes(count_bytes) as usize;

    if dim == 0 && count > 0 {
        return Err(load_error(collection, "index.bin declares zero dimension"));
    }

    let expected = count
        .checked_mul(dim)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| load_error(collection, "index.bin header overflows"))?;
    let payload = &bytes[HEADER_LEN..];
    if payload.len() != expected {
        return Err(load_error(
            collection,
            format!(
                "index.bin payload is {} bytes, header declares {} x {} vectors",
                payload.len(),
                count,
                dim
            ),
        ));
    }

    let values: Vec<f32> = payload
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Array2::from_shape_vec((count, dim), values)
        .map_err(|e| load_error(collection, format!("bad vector shape: {e}")))
}

/// Hex SHA-256 of an `index.bin` payload.
pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Read and cross-check both files of a collection directory.
pub fn read_collection(dir: &Path, collection: &str) -> Result<CollectionFiles> {
    let index_path = dir.join(INDEX_FILE);
    let docstore_path = dir.join(DOCSTORE_FILE);

    let bytes = std::fs::read(&index_path)
        .map_err(|e| load_error(collection, format!("{}: {e}", index_path.display())))?;
    let sidecar = std::fs::read_to_string(&docstore_path)
        .map_err(|e| load_error(collection, format!("{}: {e}", docstore_path.display())))?;
    let mut docstore: DocStore = serde_json::from_str(&sidecar)
        .map_err(|e| load_error(collection, format!("corrupt {DOCSTORE_FILE}: {e}")))?;

    if let Some(expected) = &docstore.index_sha256 {
        let actual = checksum(&bytes);
        if !expected.eq_ignore_ascii_case(&actual) {
            return Err(load_error(
                collection,
                format!("index.bin checksum {actual} does not match sidecar {expected}"),
            ));
        }
    }

    let vectors = decode_vectors(collection, &bytes)?;
    let (count, dimension) = vectors.dim();

    if docstore.documents.len() != count {
        return Err(load_error(
            collection,
            format!(
                "{} documents in {DOCSTORE_FILE} but {} vectors in {INDEX_FILE}",
                docstore.documents.len(),
                count
            ),
        ));
    }

    let previous = docstore.index.take().unwrap_or_default();
    if previous.dimension != 0 && previous.dimension != dimension {
        warn!(
            "Collection {}: sidecar dimension {} overridden by index.bin dimension {}",
            collection, previous.dimension, dimension
        );
    }
    docstore.index = Some(IndexInfo {
        dimension,
        count,
        distance: previous.distance,
    });

    Ok(CollectionFiles { vectors, docstore })
}
