//! Placed-entity kernel: the contract shared by every stateful object bound
//! to a world position.
//!
//! # Invariants
//! - `set_orientation` never stores `Direction::Unknown` and is a no-op for
//!   entities that are not rotatable.
//! - Writing then reading a tag reproduces orientation and multiblock state.
//!   A tag without an orientation key leaves orientation untouched.
//! - Host-layer fields are written before this crate's fields, and read
//!   before them.

pub mod behavior;
pub mod host;
pub mod packet;
pub mod placed;

pub use behavior::{AsAny, EntityBehavior, MultiBlockData};
pub use host::WorldHandle;
pub use packet::SyncPacket;
pub use placed::{
    ID_KEY, MULTI_BLOCK_KEY, ORIENTATION_KEY, OrientationPolicy, PlacedEntity, RESERVED_KEYS,
    X_KEY, Y_KEY, Z_KEY,
};

use blockspace_common::BlockPos;
use blockspace_tag::TagError;

/// Errors raised while restoring a placed entity.
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    #[error("orientation ordinal {ordinal} is out of range")]
    Decode { ordinal: i64 },
    #[error("orientation stored as a {found} tag, expected an integer")]
    OrientationType { found: &'static str },
    #[error("packet for {found} delivered to entity at {expected}")]
    PositionMismatch { expected: BlockPos, found: BlockPos },
    #[error("tag error: {0}")]
    Tag(#[from] TagError),
}
