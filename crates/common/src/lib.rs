//! Shared types for the blockspace workspace: block positions, facing
//! directions and the authoritative/remote side marker.

pub mod types;

pub use types::{BlockPos, Direction, InvalidDirection, Side};
