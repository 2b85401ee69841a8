use minimap_common::TileCoord;

use crate::source::TileSource;

/// Snapshot of a tile's cached state, as reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileStatus {
    /// Backing data for the coordinate is currently available.
    pub loaded: bool,
    /// A change event arrived and the content has not been regenerated yet.
    pub modified: bool,
    /// The tile and its four orthogonal neighbors were all loaded at the
    /// last surrounded scan.
    pub surrounded: bool,
}

/// One addressable cell of the sliding window.
///
/// The coordinate is fixed for the entry's lifetime. When the window
/// moves past it, the slot is overwritten with a fresh entry rather
/// than mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileEntry {
    pub(crate) coord: TileCoord,
    pub(crate) loaded: bool,
    pub(crate) modified: bool,
    pub(crate) surrounded: bool,
}

impl TileEntry {
    pub(crate) fn new(coord: TileCoord) -> Self {
        Self {
            coord,
            loaded: false,
            modified: false,
            surrounded: false,
        }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn is_surrounded(&self) -> bool {
        self.surrounded
    }

    pub fn status(&self) -> TileStatus {
        TileStatus {
            loaded: self.loaded,
            modified: self.modified,
            surrounded: self.surrounded,
        }
    }

    /// Re-evaluate this entry against the data source.
    ///
    /// Updates `loaded`, and regenerates the tile's content when a
    /// pending change flag is set and the tile is loaded. The flag is
    /// cleared only on success; a failed regeneration is retried on the
    /// next scan. Returns the new status if it differs from the old one.
    pub(crate) fn refresh<S: TileSource>(&mut self, source: &mut S) -> Option<TileStatus> {
        let before = self.status();
        self.loaded = source.is_tile_loaded(self.coord);
        if self.loaded && self.modified {
            match source.regenerate(self.coord) {
                Ok(_) => self.modified = false,
                Err(err) => {
                    tracing::warn!(coord = ?self.coord, error = %err, "tile regeneration failed, keeping it flagged");
                }
            }
        }
        let after = self.status();
        (after != before).then_some(after)
    }
}
