use blockspace_common::{BlockPos, Side};
use blockspace_kernel::{PlacedEntity, SyncPacket, WorldHandle};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::{HostConfig, HostError, UpdateTracker};

/// An observer's mirror of the authoritative world.
///
/// Entities here never request updates; applying a snapshot marks the
/// position for rerender instead.
#[derive(Debug)]
pub struct ClientWorld {
    config: HostConfig,
    tracker: Rc<UpdateTracker>,
    entities: BTreeMap<BlockPos, PlacedEntity>,
}

impl ClientWorld {
    /// An empty observer world.
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            tracker: Rc::new(UpdateTracker::new(Side::Remote)),
            entities: BTreeMap::new(),
        }
    }

    /// The remote-side handle mirrored entities are attached to.
    pub fn tracker(&self) -> &UpdateTracker {
        &self.tracker
    }

    /// Number of mirrored entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether nothing is mirrored.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The mirrored entity at `pos`, if any.
    pub fn get(&self, pos: BlockPos) -> Option<&PlacedEntity> {
        self.entities.get(&pos)
    }

    /// Mutable access to the mirrored entity at `pos`.
    pub fn get_mut(&mut self, pos: BlockPos) -> Option<&mut PlacedEntity> {
        self.entities.get_mut(&pos)
    }

    /// Mirror an entity at its position and attach it to this world.
    pub fn place(&mut self, mut entity: PlacedEntity) -> Result<(), HostError> {
        let pos = entity.pos();
        if self.entities.contains_key(&pos) {
            return Err(HostError::Occupied(pos));
        }
        entity.set_orientation_policy(self.config.orientation_policy);
        entity.attach(self.tracker.clone());
        self.entities.insert(pos, entity);
        Ok(())
    }

    /// Remove and detach the mirrored entity at `pos`.
    pub fn remove(&mut self, pos: BlockPos) -> Option<PlacedEntity> {
        let mut entity = self.entities.remove(&pos)?;
        entity.detach();
        self.tracker.forget(pos);
        Some(entity)
    }

    /// Apply one snapshot to the mirrored entity at its position.
    pub fn apply(&mut self, packet: &SyncPacket) -> Result<(), HostError> {
        let pos = packet.pos();
        let entity = self.entities.get_mut(&pos).ok_or(HostError::NoEntity(pos))?;
        self.tracker.set_metadata(pos, packet.metadata());
        entity
            .on_data_packet(packet)
            .map_err(|source| HostError::Entity { pos, source })
    }

    /// Decode a snapshot off the wire and apply it.
    pub fn receive(&mut self, bytes: &[u8]) -> Result<(), HostError> {
        let packet = SyncPacket::decode(bytes)?;
        self.apply(&packet)
    }

    /// Positions whose presentation must refresh, in position order.
    pub fn take_rerenders(&self) -> Vec<BlockPos> {
        self.tracker.take_rerenders()
    }

    /// Metadata byte from the last snapshot applied at `pos`.
    pub fn block_metadata(&self, pos: BlockPos) -> u8 {
        self.tracker.block_metadata(pos)
    }
}
