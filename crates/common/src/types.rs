use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Integer coordinate of one tile cell on the unbounded 2D grid.
///
/// The vertical axis is irrelevant for tile addressing; cells are keyed
/// by (x, z) only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub z: i32,
}

impl TileCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Identity of the logical space (world, dimension) an observer is in.
///
/// Tile coordinates are only comparable within one dimension; crossing
/// into a different dimension invalidates every cached tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DimensionId(pub Uuid);

impl DimensionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DimensionId {
    fn default() -> Self {
        Self::new()
    }
}
