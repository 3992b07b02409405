use blockspace_common::{BlockPos, Side};
use blockspace_kernel::WorldHandle;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

/// The world handle hosts give their entities.
///
/// Update and rerender requests land in sets, so repeated requests for one
/// position before a drain count once.
#[derive(Debug)]
pub struct UpdateTracker {
    side: Side,
    dirty: RefCell<BTreeSet<BlockPos>>,
    rerender: RefCell<BTreeSet<BlockPos>>,
    metadata: RefCell<BTreeMap<BlockPos, u8>>,
    requests: Cell<u64>,
}

impl UpdateTracker {
    /// An empty tracker for one side.
    pub fn new(side: Side) -> Self {
        Self {
            side,
            dirty: RefCell::new(BTreeSet::new()),
            rerender: RefCell::new(BTreeSet::new()),
            metadata: RefCell::new(BTreeMap::new()),
            requests: Cell::new(0),
        }
    }

    /// Positions awaiting a sync snapshot.
    pub fn pending_updates(&self) -> usize {
        self.dirty.borrow().len()
    }

    /// Total update requests received, coalesced or not.
    pub fn requests_seen(&self) -> u64 {
        self.requests.get()
    }

    /// Drain pending update positions in order.
    pub fn take_dirty(&self) -> Vec<BlockPos> {
        std::mem::take(&mut *self.dirty.borrow_mut())
            .into_iter()
            .collect()
    }

    /// Drain pending rerender positions in order.
    pub fn take_rerenders(&self) -> Vec<BlockPos> {
        std::mem::take(&mut *self.rerender.borrow_mut())
            .into_iter()
            .collect()
    }

    /// Record the metadata byte reported for `pos`.
    pub fn set_metadata(&self, pos: BlockPos, value: u8) {
        self.metadata.borrow_mut().insert(pos, value);
    }

    /// Drop every record of `pos`. Called when its occupant is removed.
    pub fn forget(&self, pos: BlockPos) {
        self.metadata.borrow_mut().remove(&pos);
        self.dirty.borrow_mut().remove(&pos);
        self.rerender.borrow_mut().remove(&pos);
    }
}

impl WorldHandle for UpdateTracker {
    fn side(&self) -> Side {
        self.side
    }

    fn mark_block_for_update(&self, pos: BlockPos) {
        self.requests.set(self.requests.get() + 1);
        if !self.dirty.borrow_mut().insert(pos) {
            tracing::trace!(%pos, "update already pending");
        }
    }

    fn mark_for_rerender(&self, pos: BlockPos) {
        self.rerender.borrow_mut().insert(pos);
    }

    fn block_metadata(&self, pos: BlockPos) -> u8 {
        self.metadata.borrow().get(&pos).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_requests_coalesce() {
        let tracker = UpdateTracker::new(Side::Authoritative);
        let pos = BlockPos::new(1, 1, 1);
        tracker.mark_block_for_update(pos);
        tracker.mark_block_for_update(pos);
        assert_eq!(tracker.pending_updates(), 1);
        assert_eq!(tracker.requests_seen(), 2);
        assert_eq!(tracker.take_dirty(), vec![pos]);
        assert_eq!(tracker.pending_updates(), 0);
    }

    #[test]
    fn dirty_drains_in_position_order() {
        let tracker = UpdateTracker::new(Side::Authoritative);
        tracker.mark_block_for_update(BlockPos::new(5, 0, 0));
        tracker.mark_block_for_update(BlockPos::new(-1, 0, 0));
        assert_eq!(
            tracker.take_dirty(),
            vec![BlockPos::new(-1, 0, 0), BlockPos::new(5, 0, 0)]
        );
    }

    #[test]
    fn metadata_defaults_to_zero() {
        let tracker = UpdateTracker::new(Side::Remote);
        let pos = BlockPos::ORIGIN;
        assert_eq!(tracker.block_metadata(pos), 0);
        tracker.set_metadata(pos, 4);
        assert_eq!(tracker.block_metadata(pos), 4);
        tracker.forget(pos);
        assert_eq!(tracker.block_metadata(pos), 0);
    }

    #[test]
    fn rerenders_drain() {
        let tracker = UpdateTracker::new(Side::Remote);
        tracker.mark_for_rerender(BlockPos::ORIGIN);
        tracker.mark_for_rerender(BlockPos::ORIGIN);
        assert_eq!(tracker.take_rerenders(), vec![BlockPos::ORIGIN]);
        assert!(tracker.take_rerenders().is_empty());
    }
}
