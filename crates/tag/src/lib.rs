//! Tag storage: the key/value tree every placed entity persists into, its
//! CBOR wire codec, and compressed region files on disk.
//!
//! # Invariants
//! - Compound keys iterate in sorted order, so encoding is deterministic.
//! - Typed getters never default: a missing or mistyped key is an error.
//! - Region files are checksummed and versioned; reads fail closed.

mod codec;
mod compound;
mod region;

pub use codec::{cbor_deserialize, cbor_serialize, decode, encode};
pub use compound::{CompoundTag, Tag};
pub use region::{REGION_SCHEMA_VERSION, RegionFile};

/// Errors from tag access, encoding and region IO.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("missing key: {0}")]
    MissingKey(String),
    #[error("key {key} holds a {found} tag, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CBOR serialization error: {0}")]
    CborEncode(String),
    #[error("CBOR deserialization error: {0}")]
    CborDecode(String),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    #[error("malformed region file: {0}")]
    MalformedRegion(String),
    #[error("{0} entries exceed the region file limit")]
    TooManyEntries(usize),
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
}
