use blockspace_common::{BlockPos, Direction};
use blockspace_tag::{CompoundTag, Tag, TagError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

use crate::behavior::{EntityBehavior, MultiBlockData};
use crate::host::WorldHandle;
use crate::packet::SyncPacket;
use crate::EntityError;

/// Host-layer key holding the behavior kind.
pub const ID_KEY: &str = "id";
/// Host-layer position keys.
pub const X_KEY: &str = "x";
pub const Y_KEY: &str = "y";
pub const Z_KEY: &str = "z";
/// Orientation ordinal, stored as a byte.
pub const ORIENTATION_KEY: &str = "direction";
/// Nested compound owned by the multiblock data object.
pub const MULTI_BLOCK_KEY: &str = "multiBlock";

/// Keys no behavior may write.
pub const RESERVED_KEYS: [&str; 6] = [ID_KEY, X_KEY, Y_KEY, Z_KEY, ORIENTATION_KEY, MULTI_BLOCK_KEY];

/// What `read_tag` does with an orientation it cannot decode.
///
/// Either way the stored orientation is left as it was and the rest of the
/// tag is still applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationPolicy {
    /// Surface the decode error to the caller.
    #[default]
    Reject,
    /// Log it and carry on.
    Ignore,
}

/// A stateful object bound to one world position.
///
/// Owns its orientation and, for multiblock members, the aggregate's data.
/// Everything type-specific is delegated to the boxed [`EntityBehavior`].
pub struct PlacedEntity {
    pos: BlockPos,
    orientation: Direction,
    behavior: Box<dyn EntityBehavior>,
    multi_block: Option<Box<dyn MultiBlockData>>,
    world: Option<Rc<dyn WorldHandle>>,
    orientation_policy: OrientationPolicy,
}

impl PlacedEntity {
    /// A detached entity at `pos` with orientation `Unknown`.
    pub fn new(pos: BlockPos, behavior: impl EntityBehavior) -> Self {
        Self {
            pos,
            orientation: Direction::Unknown,
            behavior: Box::new(behavior),
            multi_block: None,
            world: None,
            orientation_policy: OrientationPolicy::default(),
        }
    }

    /// A detached multiblock member. The capability is fixed for the
    /// entity's lifetime.
    pub fn with_multi_block(
        pos: BlockPos,
        behavior: impl EntityBehavior,
        data: impl MultiBlockData,
    ) -> Self {
        let mut entity = Self::new(pos, behavior);
        entity.multi_block = Some(Box::new(data));
        entity
    }

    /// The position this entity was placed at.
    pub fn pos(&self) -> BlockPos {
        self.pos
    }

    /// X coordinate of the position.
    pub fn x(&self) -> i32 {
        self.pos.x
    }

    /// Y coordinate of the position.
    pub fn y(&self) -> i32 {
        self.pos.y
    }

    /// Z coordinate of the position.
    pub fn z(&self) -> i32 {
        self.pos.z
    }

    /// Kind name of the behavior, saved under [`ID_KEY`].
    pub fn kind(&self) -> &'static str {
        self.behavior.kind()
    }

    /// Whether `set_orientation` can change this entity.
    pub fn is_rotatable(&self) -> bool {
        self.behavior.is_rotatable()
    }

    /// Whether the entity was built with multiblock data.
    pub fn is_multi_block(&self) -> bool {
        self.multi_block.is_some()
    }

    /// The type-specific half of the entity.
    pub fn behavior(&self) -> &dyn EntityBehavior {
        &*self.behavior
    }

    /// The behavior as its concrete type, if it is a `T`.
    pub fn behavior_as<T: EntityBehavior>(&self) -> Option<&T> {
        let behavior: &dyn EntityBehavior = &*self.behavior;
        behavior.as_any().downcast_ref::<T>()
    }

    /// Mutable access to the behavior as a `T`.
    pub fn behavior_as_mut<T: EntityBehavior>(&mut self) -> Option<&mut T> {
        let behavior: &mut dyn EntityBehavior = &mut *self.behavior;
        behavior.as_any_mut().downcast_mut::<T>()
    }

    /// The multiblock data, for multiblock members.
    pub fn multi_block_data(&self) -> Option<&dyn MultiBlockData> {
        self.multi_block.as_deref()
    }

    /// The multiblock data as its concrete type, if it is a `T`.
    pub fn multi_block_as<T: MultiBlockData>(&self) -> Option<&T> {
        let data: &dyn MultiBlockData = self.multi_block.as_deref()?;
        data.as_any().downcast_ref::<T>()
    }

    /// Mutable access to the multiblock data as a `T`.
    pub fn multi_block_as_mut<T: MultiBlockData>(&mut self) -> Option<&mut T> {
        let data: &mut dyn MultiBlockData = self.multi_block.as_deref_mut()?;
        data.as_any_mut().downcast_mut::<T>()
    }

    /// Bind this entity to a live world. Called by the host on placement.
    pub fn attach(&mut self, world: Rc<dyn WorldHandle>) {
        self.world = Some(world);
    }

    /// Unbind from the world, e.g. on removal or unload.
    pub fn detach(&mut self) -> Option<Rc<dyn WorldHandle>> {
        self.world.take()
    }

    /// Whether a host world is bound.
    pub fn is_attached(&self) -> bool {
        self.world.is_some()
    }

    /// How `read_tag` reports an undecodable orientation.
    pub fn orientation_policy(&self) -> OrientationPolicy {
        self.orientation_policy
    }

    /// Hosts set this from their config on placement.
    pub fn set_orientation_policy(&mut self, policy: OrientationPolicy) {
        self.orientation_policy = policy;
    }

    /// Save the entity. Host fields go first, then orientation and the
    /// multiblock sub-tag, then the behavior's own fields.
    pub fn write_tag(&self, tag: &mut CompoundTag) {
        self.write_host_fields(tag);
        tag.set_byte(ORIENTATION_KEY, self.orientation.ordinal() as i8);
        tag.merge(&self.owned_fields());
    }

    /// Restore the entity from a tag, in the same order `write_tag` uses.
    ///
    /// A present but undecodable orientation leaves the current orientation
    /// in place; everything else in the tag is still applied, and the error
    /// is returned or logged according to the orientation policy.
    ///
    /// If the multiblock or behavior fields fail to read, the entity is left
    /// exactly as it was before the call and that tag error is returned.
    pub fn read_tag(&mut self, tag: &CompoundTag) -> Result<(), EntityError> {
        self.read_host_fields(tag);
        let orientation = tag.get(ORIENTATION_KEY).map(decode_orientation);

        let before = self.owned_fields();
        if let Err(e) = self.read_owned_fields(tag) {
            if let Some(Err(rejected)) = &orientation {
                tracing::warn!(pos = %self.pos, error = %rejected, "orientation rejected on load");
            }
            if let Err(rollback) = self.read_owned_fields(&before) {
                tracing::error!(pos = %self.pos, error = %rollback, "rollback after failed load");
            }
            return Err(e.into());
        }

        match orientation {
            None => Ok(()),
            Some(Ok(direction)) => {
                self.restore_orientation(direction);
                Ok(())
            }
            Some(Err(e)) => {
                tracing::warn!(pos = %self.pos, error = %e, "orientation rejected on load");
                match self.orientation_policy {
                    OrientationPolicy::Reject => Err(e),
                    OrientationPolicy::Ignore => Ok(()),
                }
            }
        }
    }

    /// Current facing. `Unknown` until set or restored.
    pub fn orientation(&self) -> Direction {
        self.orientation
    }

    /// Rotate the entity. Ignored unless the behavior is rotatable and
    /// `direction` is a real direction. Returns whether it was applied.
    pub fn set_orientation(&mut self, direction: Direction) -> bool {
        if !self.is_rotatable() || direction.is_unknown() {
            tracing::trace!(pos = %self.pos, %direction, "rotation refused");
            return false;
        }
        self.orientation = direction;
        tracing::debug!(pos = %self.pos, %direction, "orientation changed");
        if self.is_attached() {
            self.mark_for_update();
        }
        true
    }

    /// Deserialize bypass: restores previously accepted state without the
    /// rotatable gate.
    fn restore_orientation(&mut self, direction: Direction) {
        self.orientation = direction;
    }

    /// Ask the host to push this entity's state to observers. No-op when
    /// detached or on a remote side.
    pub fn mark_for_update(&self) {
        if let Some(world) = &self.world {
            if !world.side().is_remote() {
                world.mark_block_for_update(self.pos);
            }
        }
    }

    /// Full-state snapshot for observers.
    pub fn description_packet(&self) -> SyncPacket {
        let mut tag = CompoundTag::new();
        self.write_tag(&mut tag);
        let metadata = self
            .world
            .as_ref()
            .map_or(0, |world| world.block_metadata(self.pos));
        SyncPacket::new(self.pos, metadata, tag)
    }

    /// Apply a snapshot produced by the authoritative copy of this entity.
    pub fn on_data_packet(&mut self, packet: &SyncPacket) -> Result<(), EntityError> {
        if packet.pos() != self.pos {
            return Err(EntityError::PositionMismatch {
                expected: self.pos,
                found: packet.pos(),
            });
        }
        let result = self.read_tag(packet.payload());
        tracing::debug!(pos = %self.pos, ok = result.is_ok(), "sync packet applied");
        if let Some(world) = &self.world {
            if world.side().is_remote() {
                world.mark_for_rerender(self.pos);
            }
        }
        result
    }

    /// Append the behavior's overlay lines to `sink`.
    pub fn add_overlay_information(&self, sink: &mut Vec<String>) {
        self.behavior.add_overlay_information(sink);
    }

    /// Overlay lines for an inspection tooltip.
    pub fn overlay_information(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.add_overlay_information(&mut lines);
        lines
    }

    /// Multiblock sub-tag and behavior fields, laid out as `write_tag`
    /// stores them.
    fn owned_fields(&self) -> CompoundTag {
        let mut tag = CompoundTag::new();
        if let Some(data) = &self.multi_block {
            let mut multi_block_tag = CompoundTag::new();
            data.write_tag(&mut multi_block_tag);
            tag.set_compound(MULTI_BLOCK_KEY, multi_block_tag);
        }

        let mut own = CompoundTag::new();
        self.behavior.write_tag(&mut own);
        debug_assert!(
            RESERVED_KEYS.iter().all(|key| !own.has_key(key)),
            "behavior {} wrote a reserved key",
            self.kind()
        );
        tag.merge(&own);
        tag
    }

    fn read_owned_fields(&mut self, tag: &CompoundTag) -> Result<(), TagError> {
        if let Some(data) = self.multi_block.as_deref_mut() {
            if tag.has_key(MULTI_BLOCK_KEY) {
                data.read_tag(tag.get_compound(MULTI_BLOCK_KEY)?)?;
            }
        }
        self.behavior.read_tag(tag)
    }

    fn write_host_fields(&self, tag: &mut CompoundTag) {
        tag.set_string(ID_KEY, self.kind());
        tag.set_int(X_KEY, self.pos.x);
        tag.set_int(Y_KEY, self.pos.y);
        tag.set_int(Z_KEY, self.pos.z);
    }

    /// Position is fixed at placement; a tag for elsewhere is only logged.
    fn read_host_fields(&self, tag: &CompoundTag) {
        if let Ok(kind) = tag.get_string(ID_KEY) {
            if kind != self.kind() {
                tracing::warn!(pos = %self.pos, stored = kind, actual = self.kind(), "kind mismatch");
            }
        }
        if let (Ok(x), Ok(y), Ok(z)) = (tag.get_int(X_KEY), tag.get_int(Y_KEY), tag.get_int(Z_KEY))
        {
            let stored = BlockPos::new(x, y, z);
            if stored != self.pos {
                tracing::warn!(pos = %self.pos, %stored, "position mismatch");
            }
        }
    }
}

impl fmt::Debug for PlacedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlacedEntity")
            .field("pos", &self.pos)
            .field("orientation", &self.orientation)
            .field("behavior", &self.behavior)
            .field("multi_block", &self.multi_block)
            .field("attached", &self.is_attached())
            .finish()
    }
}

fn decode_orientation(value: &Tag) -> Result<Direction, EntityError> {
    let ordinal = value.as_i64().ok_or(EntityError::OrientationType {
        found: value.type_name(),
    })?;
    Direction::from_ordinal(ordinal).map_err(|e| EntityError::Decode { ordinal: e.0 })
}
