//! Region files: a batch of compound tags persisted as one file.
//!
//! On-disk form is a four-byte magic, the little-endian length of a CBOR
//! header, the header itself (schema version, entry count, SHA-256 of the
//! payload), then the raw payload: a zstd-compressed CBOR list of compounds.
//! Reads verify version and checksum before decompressing.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::codec::{cbor_deserialize, cbor_serialize};
use crate::{CompoundTag, TagError};

/// Current region schema version.
pub const REGION_SCHEMA_VERSION: u32 = 1;

const MAGIC: &[u8; 4] = b"BSRG";
const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegionHeader {
    schema_version: u32,
    entry_count: u32,
    sha256: String,
}

/// A region file at a fixed path.
#[derive(Debug, Clone)]
pub struct RegionFile {
    path: PathBuf,
    compression_level: i32,
}

impl RegionFile {
    /// A handle for `path`. Nothing is touched until a read or write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    /// Override the zstd level used by [`RegionFile::write`].
    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    /// Location of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file is on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Replace the file contents with `tags`.
    pub fn write(&self, tags: &[CompoundTag]) -> Result<(), TagError> {
        let entry_count = entry_count(tags.len())?;
        let cbor_bytes = cbor_serialize(tags)?;
        let payload = zstd_compress(&cbor_bytes, self.compression_level)?;
        let header = RegionHeader {
            schema_version: REGION_SCHEMA_VERSION,
            entry_count,
            sha256: sha256_hex(&payload),
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, frame(&header, &payload)?)?;
        tracing::debug!(path = %self.path.display(), entries = tags.len(), "region written");
        Ok(())
    }

    /// Read every tag back. Fails closed on version or checksum mismatch.
    pub fn read(&self) -> Result<Vec<CompoundTag>, TagError> {
        let raw = std::fs::read(&self.path)?;
        let (header, payload) = unframe(&raw)?;
        if header.schema_version != REGION_SCHEMA_VERSION {
            return Err(TagError::SchemaMismatch {
                file_version: header.schema_version,
                expected_version: REGION_SCHEMA_VERSION,
            });
        }
        let actual = sha256_hex(payload);
        if actual != header.sha256 {
            tracing::warn!(path = %self.path.display(), "region checksum mismatch");
            return Err(TagError::IntegrityMismatch {
                expected: header.sha256,
                actual,
            });
        }
        let cbor_bytes = zstd_decompress(payload)?;
        let tags: Vec<CompoundTag> = cbor_deserialize(&cbor_bytes)?;
        if tags.len() != header.entry_count as usize {
            return Err(TagError::IntegrityMismatch {
                expected: format!("{} entries", header.entry_count),
                actual: format!("{} entries", tags.len()),
            });
        }
        Ok(tags)
    }
}

fn entry_count(len: usize) -> Result<u32, TagError> {
    u32::try_from(len).map_err(|_| TagError::TooManyEntries(len))
}

fn frame(header: &RegionHeader, payload: &[u8]) -> Result<Vec<u8>, TagError> {
    let header_bytes = cbor_serialize(header)?;
    let header_len = u32::try_from(header_bytes.len())
        .map_err(|_| TagError::MalformedRegion("header too large".into()))?;
    let mut out = Vec::with_capacity(8 + header_bytes.len() + payload.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&header_len.to_le_bytes());
    out.extend_from_slice(&header_bytes);
    out.extend_from_slice(payload);
    Ok(out)
}

fn unframe(raw: &[u8]) -> Result<(RegionHeader, &[u8]), TagError> {
    let rest = raw
        .strip_prefix(MAGIC.as_slice())
        .ok_or_else(|| TagError::MalformedRegion("bad magic".into()))?;
    let (len_bytes, rest) = rest
        .split_first_chunk::<4>()
        .ok_or_else(|| TagError::MalformedRegion("truncated header length".into()))?;
    let header_len = u32::from_le_bytes(*len_bytes) as usize;
    if rest.len() < header_len {
        return Err(TagError::MalformedRegion("truncated header".into()));
    }
    let (header_bytes, payload) = rest.split_at(header_len);
    Ok((cbor_deserialize(header_bytes)?, payload))
}

fn zstd_compress(data: &[u8], level: i32) -> Result<Vec<u8>, TagError> {
    let mut encoder = zstd::Encoder::new(Vec::new(), level)?;
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn zstd_decompress(data: &[u8]) -> Result<Vec<u8>, TagError> {
    let mut decoder = zstd::Decoder::new(data)?;
    let mut buf = Vec::new();
    decoder.read_to_end(&mut buf)?;
    Ok(buf)
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
