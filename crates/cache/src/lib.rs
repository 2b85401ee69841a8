//! Observer-centered sliding-window cache of map-tile state.
//!
//! The window tracks a moving observer across an unbounded chunk grid,
//! keeping a fixed `width x height` rectangle of per-tile bookkeeping
//! alive. Re-centering reuses every entry still inside the rectangle
//! and replaces only the rows and columns that scrolled out of range.
//!
//! # Invariants
//! - A live entry's coordinate always matches the coordinate implied by
//!   its slot index and the current bounds.
//! - Entries are replaced wholesale, never mutated into a different
//!   coordinate.
//! - Scans and queries are no-ops until the first fill.

pub mod feed;
pub mod source;
pub mod tile;
pub mod window;

pub use feed::{ChangeSink, WorldUpdateFeed};
pub use source::{ChangeObserver, SourceError, TileSource};
pub use tile::{TileEntry, TileStatus};
pub use window::{TileWindow, WindowBounds, WindowConfig, WindowStats};

pub fn crate_info() -> &'static str {
    "minimap-cache v0.1.0"
}
