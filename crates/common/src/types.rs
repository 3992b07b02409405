use glam::IVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer coordinates of a single world position.
///
/// Ordered x, then y, then z so that `BTreeMap`/`BTreeSet` keyed by position
/// iterate deterministically.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    /// `(0, 0, 0)`.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Position from its three coordinates.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The neighbouring position one step towards `direction`.
    /// `Direction::Unknown` yields the position itself.
    pub fn offset(self, direction: Direction) -> Self {
        Self::from(IVec3::from(self) + direction.step())
    }
}

impl From<IVec3> for BlockPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<BlockPos> for IVec3 {
    fn from(p: BlockPos) -> Self {
        IVec3::new(p.x, p.y, p.z)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Facing of a placed entity.
///
/// The discriminants are the persisted ordinals and must never be reordered.
/// `Unknown` is the unset sentinel.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Direction {
    Down = 0,
    Up = 1,
    North = 2,
    South = 3,
    West = 4,
    East = 5,
    #[default]
    Unknown = 6,
}

/// An ordinal that does not name any [`Direction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid direction ordinal: {0}")]
pub struct InvalidDirection(pub i64);

impl Direction {
    /// Every variant including `Unknown`, in ordinal order.
    pub const ALL: [Direction; 7] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
        Direction::Unknown,
    ];

    /// The persisted ordinal, 0 to 6.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Decode a persisted ordinal. Out-of-range values are rejected rather
    /// than clamped.
    pub fn from_ordinal(ordinal: i64) -> Result<Self, InvalidDirection> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(InvalidDirection(ordinal))
    }

    /// Whether this is the unset sentinel.
    pub fn is_unknown(self) -> bool {
        self == Direction::Unknown
    }

    /// Unit step in world axes (north is -z, east is +x).
    pub fn step(self) -> IVec3 {
        match self {
            Direction::Down => IVec3::NEG_Y,
            Direction::Up => IVec3::Y,
            Direction::North => IVec3::NEG_Z,
            Direction::South => IVec3::Z,
            Direction::West => IVec3::NEG_X,
            Direction::East => IVec3::X,
            Direction::Unknown => IVec3::ZERO,
        }
    }

    /// Lowercase name used in logs and overlays.
    pub fn name(self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Up => "up",
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
            Direction::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which copy of the simulation a world belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The single canonical simulation.
    Authoritative,
    /// An observer mirroring the authoritative state.
    Remote,
}

impl Side {
    /// Whether this is an observer side.
    pub fn is_remote(self) -> bool {
        self == Side::Remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_direction_is_unknown() {
        assert_eq!(Direction::default(), Direction::Unknown);
    }

    #[test]
    fn ordinals_are_stable() {
        for (i, d) in Direction::ALL.iter().enumerate() {
            assert_eq!(d.ordinal() as usize, i);
            assert_eq!(Direction::from_ordinal(i as i64), Ok(*d));
        }
        assert_eq!(Direction::North.ordinal(), 2);
    }

    #[test]
    fn out_of_range_ordinal_rejected() {
        assert_eq!(Direction::from_ordinal(7), Err(InvalidDirection(7)));
        assert_eq!(Direction::from_ordinal(-1), Err(InvalidDirection(-1)));
        assert!(Direction::from_ordinal(i64::MAX).is_err());
    }

    #[test]
    fn offset_follows_step() {
        let p = BlockPos::new(1, 2, 3);
        assert_eq!(p.offset(Direction::North), BlockPos::new(1, 2, 2));
        assert_eq!(p.offset(Direction::East), BlockPos::new(2, 2, 3));
        assert_eq!(p.offset(Direction::Unknown), p);
    }

    #[test]
    fn positions_order_by_x_then_y_then_z() {
        let mut v = vec![
            BlockPos::new(1, 0, 0),
            BlockPos::new(0, 5, 0),
            BlockPos::new(0, 0, 9),
        ];
        v.sort();
        assert_eq!(v[0], BlockPos::new(0, 0, 9));
        assert_eq!(v[2], BlockPos::new(1, 0, 0));
    }
}
