//! Hosts for placed entities: an authoritative world that persists its
//! entities and batches sync snapshots, and an observer world that mirrors
//! them.
//!
//! # Invariants
//! - Update requests coalesce per position until the next flush.
//! - Loading is all-or-nothing for structural failures. A rejected
//!   orientation only costs that one entity its facing.

mod client;
mod config;
mod server;
mod tracker;

pub use client::ClientWorld;
pub use config::HostConfig;
pub use server::ServerWorld;
pub use tracker::UpdateTracker;

use blockspace_common::BlockPos;
use blockspace_kernel::EntityError;
use blockspace_tag::TagError;

/// Errors from host operations.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("position {0} is already occupied")]
    Occupied(BlockPos),
    #[error("no entity at {0}")]
    NoEntity(BlockPos),
    #[error("unknown entity kind: {0}")]
    UnknownKind(String),
    #[error("entity at {pos}: {source}")]
    Entity { pos: BlockPos, source: EntityError },
    #[error("tag error: {0}")]
    Tag(#[from] TagError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
