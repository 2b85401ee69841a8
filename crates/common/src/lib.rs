//! Shared types for the minimap workspace.
//!
//! # Invariants
//! - Coordinate and identity types are plain data, cheap to copy and hash.
//! - Nothing here depends on the cache or the app layer.

pub mod types;

pub use types::{DimensionId, TileCoord};
