use blockspace_common::{BlockPos, Side};

/// What a placed entity may ask of the world it is attached to.
///
/// Entities hold this as `Rc<dyn WorldHandle>`: every call happens on the
/// owning side's logic thread, so implementations use interior mutability.
pub trait WorldHandle {
    fn side(&self) -> Side;

    /// Schedule a sync snapshot of `pos` for observers. Repeated calls
    /// before the next flush must coalesce.
    fn mark_block_for_update(&self, pos: BlockPos);

    /// Ask local presentation layers to refresh `pos`.
    fn mark_for_rerender(&self, pos: BlockPos);

    /// Host-supplied metadata byte for the block at `pos`.
    fn block_metadata(&self, _pos: BlockPos) -> u8 {
        0
    }
}
