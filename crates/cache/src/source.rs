use std::sync::Arc;

use minimap_common::TileCoord;

use crate::tile::TileStatus;

/// Errors reported by a tile source while regenerating tile content.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("tile not available in the backing world: {0:?}")]
    Unavailable(TileCoord),
    #[error("tile content generation failed: {0}")]
    Generation(String),
}

/// External world/terrain data source consulted by the cache.
///
/// The cache never inspects tile content; `Content` is whatever the
/// source produces for its own consumers (an image, a mesh, `()`). The
/// cache only observes whether regeneration succeeded, and retries a
/// failed tile on the next scan.
pub trait TileSource {
    type Content;

    /// Whether backing data for the coordinate is currently available.
    fn is_tile_loaded(&self, coord: TileCoord) -> bool;

    /// Recompute the content for a coordinate flagged as changed.
    fn regenerate(&mut self, coord: TileCoord) -> Result<Self::Content, SourceError>;
}

/// Render-side consumer notified when a tile's cached status changes.
///
/// Notifications are fire-and-forget; implementations must not block
/// the scan that produced them.
pub trait ChangeObserver {
    fn tile_changed(&self, coord: TileCoord, status: TileStatus);
}

/// An observer that discards every notification.
impl ChangeObserver for () {
    fn tile_changed(&self, _coord: TileCoord, _status: TileStatus) {}
}

impl<T: ChangeObserver + ?Sized> ChangeObserver for Arc<T> {
    fn tile_changed(&self, coord: TileCoord, status: TileStatus) {
        (**self).tile_changed(coord, status);
    }
}
