//! Entity types used by the demo and by `inspect` to rebuild saved tags.

use blockspace_common::BlockPos;
use blockspace_kernel::{EntityBehavior, MultiBlockData, PlacedEntity};
use blockspace_tag::{CompoundTag, TagError};

/// Storage block that can face any direction.
#[derive(Debug, Default)]
pub struct Crate {
    pub items: i32,
}

impl EntityBehavior for Crate {
    fn kind(&self) -> &'static str {
        "crate"
    }

    fn is_rotatable(&self) -> bool {
        true
    }

    fn add_overlay_information(&self, sink: &mut Vec<String>) {
        sink.push(format!("Items: {}", self.items));
    }

    fn write_tag(&self, tag: &mut CompoundTag) {
        tag.set_int("items", self.items);
    }

    fn read_tag(&mut self, tag: &CompoundTag) -> Result<(), TagError> {
        if tag.has_key("items") {
            self.items = tag.get_int("items")?;
        }
        Ok(())
    }
}

/// Fixed planter; growth advances, facing never does.
#[derive(Debug, Default)]
pub struct Planter {
    pub growth: i8,
}

impl EntityBehavior for Planter {
    fn kind(&self) -> &'static str {
        "planter"
    }

    fn is_rotatable(&self) -> bool {
        false
    }

    fn add_overlay_information(&self, sink: &mut Vec<String>) {
        sink.push(format!("Growth: {}/7", self.growth));
    }

    fn write_tag(&self, tag: &mut CompoundTag) {
        tag.set_byte("growth", self.growth);
    }

    fn read_tag(&mut self, tag: &CompoundTag) -> Result<(), TagError> {
        if tag.has_key("growth") {
            self.growth = tag.get_byte("growth")?;
        }
        Ok(())
    }
}

/// One block of a multi-block tank.
#[derive(Debug, Default)]
pub struct TankSegment;

impl EntityBehavior for TankSegment {
    fn kind(&self) -> &'static str {
        "tank"
    }

    fn is_rotatable(&self) -> bool {
        false
    }

    fn add_overlay_information(&self, sink: &mut Vec<String>) {
        sink.push("Tank segment".to_string());
    }
}

/// Shared state of a whole tank, persisted by every segment.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TankData {
    pub origin: BlockPos,
    pub size: i32,
    pub fluid: String,
    pub volume: i64,
}

impl MultiBlockData for TankData {
    fn write_tag(&self, tag: &mut CompoundTag) {
        tag.set_int("originX", self.origin.x);
        tag.set_int("originY", self.origin.y);
        tag.set_int("originZ", self.origin.z);
        tag.set_int("size", self.size);
        tag.set_string("fluid", self.fluid.clone());
        tag.set_long("volume", self.volume);
    }

    fn read_tag(&mut self, tag: &CompoundTag) -> Result<(), TagError> {
        self.origin = BlockPos::new(
            tag.get_int("originX")?,
            tag.get_int("originY")?,
            tag.get_int("originZ")?,
        );
        self.size = tag.get_int("size")?;
        self.fluid = tag.get_string("fluid")?.to_string();
        self.volume = tag.get_long("volume")?;
        Ok(())
    }
}

/// Build an empty entity for a saved kind.
pub fn create(kind: &str, pos: BlockPos) -> Option<PlacedEntity> {
    match kind {
        "crate" => Some(PlacedEntity::new(pos, Crate::default())),
        "planter" => Some(PlacedEntity::new(pos, Planter::default())),
        "tank" => Some(PlacedEntity::with_multi_block(
            pos,
            TankSegment,
            TankData::default(),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockspace_common::Direction;

    #[test]
    fn every_kind_is_constructible() {
        for kind in ["crate", "planter", "tank"] {
            let entity = create(kind, BlockPos::ORIGIN).unwrap();
            assert_eq!(entity.kind(), kind);
        }
        assert!(create("furnace", BlockPos::ORIGIN).is_none());
    }

    #[test]
    fn only_crate_rotates() {
        let mut crate_ = create("crate", BlockPos::ORIGIN).unwrap();
        let mut planter = create("planter", BlockPos::ORIGIN).unwrap();
        assert!(crate_.set_orientation(Direction::East));
        assert!(!planter.set_orientation(Direction::East));
    }

    #[test]
    fn tank_data_survives_tag() {
        let data = TankData {
            origin: BlockPos::new(4, 60, 4),
            size: 3,
            fluid: "water".into(),
            volume: 27_000,
        };
        let source = PlacedEntity::with_multi_block(BlockPos::new(5, 60, 4), TankSegment, data.clone());
        let mut tag = CompoundTag::new();
        source.write_tag(&mut tag);

        let mut target = create("tank", BlockPos::new(5, 60, 4)).unwrap();
        target.read_tag(&tag).unwrap();
        assert_eq!(target.multi_block_as::<TankData>(), Some(&data));
    }
}
