use blockspace_common::{BlockPos, Direction, Side};
use blockspace_kernel::{EntityError, ID_KEY, PlacedEntity, SyncPacket, X_KEY, Y_KEY, Z_KEY};
use blockspace_tag::{CompoundTag, RegionFile};
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use crate::{HostConfig, HostError, UpdateTracker};

/// The authoritative world.
///
/// Owns every placed entity keyed by position. Entities request updates
/// through the shared [`UpdateTracker`]; `flush_updates` turns the pending
/// set into one snapshot per position.
#[derive(Debug)]
pub struct ServerWorld {
    config: HostConfig,
    tracker: Rc<UpdateTracker>,
    entities: BTreeMap<BlockPos, PlacedEntity>,
}

impl ServerWorld {
    /// An empty authoritative world.
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            tracker: Rc::new(UpdateTracker::new(Side::Authoritative)),
            entities: BTreeMap::new(),
        }
    }

    /// Settings this world was created with.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// The handle every placed entity is attached to.
    pub fn tracker(&self) -> &UpdateTracker {
        &self.tracker
    }

    /// Number of placed entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether nothing is placed.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Occupied positions in order.
    pub fn positions(&self) -> impl Iterator<Item = BlockPos> + '_ {
        self.entities.keys().copied()
    }

    /// The entity at `pos`, if any.
    pub fn get(&self, pos: BlockPos) -> Option<&PlacedEntity> {
        self.entities.get(&pos)
    }

    /// Mutable access to the entity at `pos`.
    pub fn get_mut(&mut self, pos: BlockPos) -> Option<&mut PlacedEntity> {
        self.entities.get_mut(&pos)
    }

    /// Place an entity at its position and attach it. Observers are told
    /// about it on the next flush.
    pub fn place(&mut self, mut entity: PlacedEntity) -> Result<(), HostError> {
        let pos = entity.pos();
        if self.entities.contains_key(&pos) {
            return Err(HostError::Occupied(pos));
        }
        entity.set_orientation_policy(self.config.orientation_policy);
        entity.attach(self.tracker.clone());
        entity.mark_for_update();
        tracing::debug!(%pos, kind = entity.kind(), "entity placed");
        self.entities.insert(pos, entity);
        Ok(())
    }

    /// Remove and detach the occupant of `pos`.
    pub fn remove(&mut self, pos: BlockPos) -> Option<PlacedEntity> {
        let mut entity = self.entities.remove(&pos)?;
        entity.detach();
        self.tracker.forget(pos);
        tracing::debug!(%pos, "entity removed");
        Some(entity)
    }

    /// Set the metadata byte carried by snapshots for `pos`.
    pub fn set_block_metadata(&mut self, pos: BlockPos, value: u8) {
        self.tracker.set_metadata(pos, value);
    }

    /// Rotate the occupant of `pos`. `Ok(false)` means the rotation was
    /// refused by the entity.
    pub fn rotate(&mut self, pos: BlockPos, direction: Direction) -> Result<bool, HostError> {
        let entity = self.entities.get_mut(&pos).ok_or(HostError::NoEntity(pos))?;
        Ok(entity.set_orientation(direction))
    }

    /// Drain pending update requests into snapshots, one per live position.
    pub fn flush_updates(&mut self) -> Vec<SyncPacket> {
        let _span = tracing::info_span!("sync_flush").entered();
        let packets: Vec<SyncPacket> = self
            .tracker
            .take_dirty()
            .into_iter()
            .filter_map(|pos| self.entities.get(&pos))
            .map(PlacedEntity::description_packet)
            .collect();
        tracing::debug!(packets = packets.len(), "flushed updates");
        packets
    }

    /// Snapshots of every entity, for an observer joining late.
    pub fn full_sync(&self) -> Vec<SyncPacket> {
        self.entities
            .values()
            .map(PlacedEntity::description_packet)
            .collect()
    }

    /// Serialize every entity in position order.
    pub fn save(&self) -> Vec<CompoundTag> {
        self.entities
            .values()
            .map(|entity| {
                let mut tag = CompoundTag::new();
                entity.write_tag(&mut tag);
                tag
            })
            .collect()
    }

    /// Restore entities from saved tags. `factory` builds an empty entity
    /// for a kind and position.
    ///
    /// An undecodable orientation only costs that entity its facing: it is
    /// placed with the rest of its state. Any other failure (missing host
    /// fields, unknown kind, occupied position, unreadable entity fields)
    /// aborts the batch and nothing is placed.
    pub fn load(
        &mut self,
        tags: &[CompoundTag],
        factory: impl Fn(&str, BlockPos) -> Option<PlacedEntity>,
    ) -> Result<usize, HostError> {
        let mut restored = Vec::with_capacity(tags.len());
        let mut unoriented = 0usize;
        for tag in tags {
            let kind = tag.get_string(ID_KEY)?;
            let pos = BlockPos::new(tag.get_int(X_KEY)?, tag.get_int(Y_KEY)?, tag.get_int(Z_KEY)?);
            let taken = self.entities.contains_key(&pos)
                || restored.iter().any(|e: &PlacedEntity| e.pos() == pos);
            if taken {
                return Err(HostError::Occupied(pos));
            }
            let mut entity =
                factory(kind, pos).ok_or_else(|| HostError::UnknownKind(kind.to_string()))?;
            entity.set_orientation_policy(self.config.orientation_policy);
            match entity.read_tag(tag) {
                Ok(()) => {}
                Err(EntityError::Decode { .. } | EntityError::OrientationType { .. }) => {
                    unoriented += 1;
                }
                Err(source) => return Err(HostError::Entity { pos, source }),
            }
            restored.push(entity);
        }
        let count = restored.len();
        for entity in restored {
            self.place(entity)?;
        }
        tracing::info!(count, unoriented, "entities loaded");
        Ok(count)
    }

    /// Write every entity to a region file.
    pub fn save_region(&self, path: impl AsRef<Path>) -> Result<(), HostError> {
        RegionFile::new(path)
            .with_compression_level(self.config.compression_level)
            .write(&self.save())?;
        Ok(())
    }

    /// Read a region file and [`load`](Self::load) its tags.
    pub fn load_region(
        &mut self,
        path: impl AsRef<Path>,
        factory: impl Fn(&str, BlockPos) -> Option<PlacedEntity>,
    ) -> Result<usize, HostError> {
        let tags = RegionFile::new(path).read()?;
        self.load(&tags, factory)
    }
}
