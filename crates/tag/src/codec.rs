use serde::{Deserialize, Serialize};

use crate::{CompoundTag, TagError};

/// Serialize any value to CBOR.
pub fn cbor_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, TagError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| TagError::CborEncode(e.to_string()))?;
    Ok(buf)
}

/// Deserialize a value from CBOR.
pub fn cbor_deserialize<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, TagError> {
    ciborium::from_reader(data).map_err(|e| TagError::CborDecode(e.to_string()))
}

/// Encode a compound tag to its CBOR wire form.
pub fn encode(tag: &CompoundTag) -> Result<Vec<u8>, TagError> {
    cbor_serialize(tag)
}

/// Decode a compound tag from its CBOR wire form.
pub fn decode(data: &[u8]) -> Result<CompoundTag, TagError> {
    cbor_deserialize(data)
}
