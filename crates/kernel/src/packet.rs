use blockspace_common::BlockPos;
use blockspace_tag::{CompoundTag, TagError, cbor_deserialize, cbor_serialize};
use serde::{Deserialize, Serialize};

/// Full-state snapshot of one placed entity, sent from the authoritative
/// side to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPacket {
    pos: BlockPos,
    metadata: u8,
    payload: CompoundTag,
}

impl SyncPacket {
    /// A snapshot of `payload` for the entity at `pos`.
    pub fn new(pos: BlockPos, metadata: u8, payload: CompoundTag) -> Self {
        Self {
            pos,
            metadata,
            payload,
        }
    }

    /// Position of the entity the snapshot belongs to.
    pub fn pos(&self) -> BlockPos {
        self.pos
    }

    /// Host metadata byte for the position.
    pub fn metadata(&self) -> u8 {
        self.metadata
    }

    /// The entity's full saved tag.
    pub fn payload(&self) -> &CompoundTag {
        &self.payload
    }

    /// CBOR bytes for an arbitrary byte transport.
    pub fn encode(&self) -> Result<Vec<u8>, TagError> {
        cbor_serialize(self)
    }

    /// Inverse of [`SyncPacket::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, TagError> {
        cbor_deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_survives_transport() {
        let mut payload = CompoundTag::new();
        payload.set_byte("direction", 3);
        let packet = SyncPacket::new(BlockPos::new(-4, 64, 12), 5, payload);

        let bytes = packet.encode().unwrap();
        let back = SyncPacket::decode(&bytes).unwrap();
        assert_eq!(back, packet);
        assert_eq!(back.metadata(), 5);
        assert_eq!(back.pos(), BlockPos::new(-4, 64, 12));
    }

    #[test]
    fn truncated_packet_rejected() {
        let packet = SyncPacket::new(BlockPos::ORIGIN, 0, CompoundTag::new());
        let bytes = packet.encode().unwrap();
        assert!(SyncPacket::decode(&bytes[..bytes.len() - 1]).is_err());
    }
}
