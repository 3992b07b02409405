//! Capabilities supplied by concrete entity types.

use blockspace_tag::{CompoundTag, TagError};
use std::any::Any;
use std::fmt;

/// Downcasting support for behavior and multiblock trait objects.
///
/// Blanket-implemented for every `'static` type; implementors never write it.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The per-type half of a placed entity.
///
/// `PlacedEntity` owns one of these and calls back into it for capability
/// queries, overlay lines and the type's own persisted fields.
pub trait EntityBehavior: AsAny + fmt::Debug {
    /// Stable type name, persisted under the host `id` key.
    fn kind(&self) -> &'static str;

    /// Whether `set_orientation` may change this entity's facing.
    fn is_rotatable(&self) -> bool;

    /// Append lines for the look-at overlay. No default content.
    fn add_overlay_information(&self, sink: &mut Vec<String>);

    /// Write type-specific fields. Must not use any key in
    /// [`RESERVED_KEYS`](crate::RESERVED_KEYS).
    fn write_tag(&self, _tag: &mut CompoundTag) {}

    /// Read type-specific fields back.
    fn read_tag(&mut self, _tag: &CompoundTag) -> Result<(), TagError> {
        Ok(())
    }
}

/// State of an aggregate structure spanning several positions, persisted by
/// each member entity under the multiblock key.
pub trait MultiBlockData: AsAny + fmt::Debug {
    fn write_tag(&self, tag: &mut CompoundTag);

    fn read_tag(&mut self, tag: &CompoundTag) -> Result<(), TagError>;
}
