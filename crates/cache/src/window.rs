use std::sync::{Mutex, MutexGuard, PoisonError};

use glam::Vec3;
use minimap_common::{DimensionId, TileCoord};
use serde::{Deserialize, Serialize};

use crate::source::{ChangeObserver, TileSource};
use crate::tile::TileEntry;

/// Window dimensions and the world-unit size of one grid cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Number of columns in the window.
    pub width: usize,
    /// Number of rows in the window.
    pub height: usize,
    /// Edge length of one grid cell in world units.
    pub cell_size: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 17,
            height: 17,
            cell_size: 16.0,
        }
    }
}

/// Inclusive grid-coordinate bounding box covered by the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl WindowBounds {
    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.x >= self.left
            && coord.x <= self.right
            && coord.z >= self.top
            && coord.z <= self.bottom
    }
}

/// Counters describing recent window activity, for instrumentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowStats {
    /// Entries carried over by the most recent re-center.
    pub tiles_reused_last_move: usize,
    /// Fresh entries written by the most recent re-center.
    pub tiles_created_last_move: usize,
    /// Entries whose status changed during the last change scan.
    pub tiles_changed_last_scan: usize,
    /// Total live entries once the window is ready.
    pub tiles_total: usize,
    /// Full fills performed over the window's lifetime.
    pub full_fills: u64,
    /// Incremental shifts performed over the window's lifetime.
    pub shifts: u64,
}

struct WindowState {
    width: usize,
    height: usize,
    tiles: Vec<TileEntry>,
    center: Option<(DimensionId, TileCoord)>,
    bounds: WindowBounds,
    ready: bool,
    stats: WindowStats,
}

/// Bounded, observer-centered cache of map-tile state.
///
/// Holds a fixed `width x height` rectangle of [`TileEntry`] slots in a
/// flat row-major buffer (`index = x + z * width`). Re-centering slides
/// the buffer in place and replaces only the entries that scrolled out
/// of range; everything still inside the rectangle is reused as-is.
///
/// The tick operations (`center_on` and the scans) are expected from a
/// single control thread. [`TileWindow::register_change_at`] may arrive
/// from the change feed at any time; one mutex guards the state for
/// both, and `center_on` holds it for the duration of buffer
/// replacement.
pub struct TileWindow<O> {
    cell_size: f32,
    observer: O,
    state: Mutex<WindowState>,
}

impl<O: ChangeObserver> TileWindow<O> {
    /// Create a window with the given dimensions, centered nowhere yet.
    ///
    /// The first `center_on` call performs the initial fill.
    pub fn new(config: WindowConfig, observer: O) -> Self {
        assert!(
            config.width > 0 && config.height > 0,
            "window dimensions must be positive"
        );
        assert!(config.cell_size > 0.0, "cell_size must be positive");
        Self {
            cell_size: config.cell_size,
            observer,
            state: Mutex::new(WindowState {
                width: config.width,
                height: config.height,
                tiles: Vec::with_capacity(config.width * config.height),
                center: None,
                bounds: WindowBounds {
                    left: 0,
                    top: 0,
                    right: 0,
                    bottom: 0,
                },
                ready: false,
                stats: WindowStats::default(),
            }),
        }
    }

    /// Convert an observer world position to its containing grid cell.
    pub fn cell_at(&self, position: Vec3) -> TileCoord {
        TileCoord::new(
            (position.x / self.cell_size).floor() as i32,
            (position.z / self.cell_size).floor() as i32,
        )
    }

    fn state(&self) -> MutexGuard<'_, WindowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-center the window on the observer.
    ///
    /// Idempotent while the observer stays inside its current cell.
    /// Small moves shift the buffer and replace only the newly exposed
    /// rows and columns; the first call, a dimension change, or a
    /// displacement of at least the window size falls back to a full
    /// fill.
    pub fn center_on(&self, dimension: DimensionId, position: Vec3) {
        let cell = self.cell_at(position);
        let mut state = self.state();
        if state.center == Some((dimension, cell)) {
            return;
        }
        let _span = tracing::info_span!("window_recenter", x = cell.x, z = cell.z).entered();
        match state.center {
            None => {
                state.fill_all(cell);
                tracing::debug!(?cell, "initial fill");
            }
            Some((last_dimension, last_cell)) => {
                let dx = cell.x - last_cell.x;
                let dz = cell.z - last_cell.z;
                if last_dimension != dimension
                    || dx.unsigned_abs() as usize >= state.width
                    || dz.unsigned_abs() as usize >= state.height
                {
                    state.fill_all(cell);
                    tracing::debug!(?cell, dx, dz, "window wholly stale, refilling");
                } else {
                    state.shift(dx, dz, cell);
                    tracing::debug!(?cell, dx, dz, "shifted window");
                }
            }
        }
        state.center = Some((dimension, cell));
        state.recompute_bounds();
    }

    /// Ask every live entry to re-evaluate its status against the data
    /// source, reporting entries that actually changed to the observer.
    ///
    /// No-op until the window has been filled.
    pub fn scan_for_changes<S: TileSource>(&self, source: &mut S) {
        let mut state = self.state();
        if !state.ready {
            return;
        }
        let mut changed = 0;
        for tile in state.tiles.iter_mut() {
            if let Some(status) = tile.refresh(source) {
                changed += 1;
                self.observer.tile_changed(tile.coord, status);
            }
        }
        let total = state.tiles.len();
        state.stats.tiles_changed_last_scan = changed;
        tracing::trace!(changed, total, "change scan complete");
    }

    /// Recompute the surrounded flag for every live entry from the
    /// window's own bookkeeping, reporting transitions to the observer.
    ///
    /// Entries on the outer ring are never surrounded; their neighbors
    /// fall outside the window. No-op until the window has been filled.
    pub fn scan_for_surrounded(&self) {
        let mut state = self.state();
        if !state.ready {
            return;
        }
        let (w, h) = (state.width, state.height);
        let mut surrounded = vec![false; state.tiles.len()];
        for z in 1..h - 1 {
            for x in 1..w - 1 {
                let i = x + z * w;
                let tiles = &state.tiles;
                surrounded[i] = tiles[i].loaded
                    && tiles[i - 1].loaded
                    && tiles[i + 1].loaded
                    && tiles[i - w].loaded
                    && tiles[i + w].loaded;
            }
        }
        for (tile, now) in state.tiles.iter_mut().zip(surrounded) {
            if tile.surrounded != now {
                tile.surrounded = now;
                self.observer.tile_changed(tile.coord, tile.status());
            }
        }
    }

    /// Record an external change notification for a coordinate.
    ///
    /// Out-of-window coordinates are ignored; a late or stale
    /// notification must never disturb the caller. Safe to call from a
    /// different thread than the tick operations.
    pub fn register_change_at(&self, coord: TileCoord) {
        let mut state = self.state();
        if !state.ready || !state.bounds.contains(coord) {
            tracing::trace!(?coord, "ignoring change outside the window");
            return;
        }
        let index = state.index_of(coord);
        match state.tiles.get_mut(index) {
            Some(tile) => tile.modified = true,
            None => {
                tracing::debug!(?coord, index, "change notification addressed an invalid slot");
            }
        }
    }

    /// Whether the coordinate and all four orthogonal neighbors were
    /// loaded at the last surrounded scan.
    ///
    /// False for anything outside the current window; the cached flag is
    /// returned as-is, never recomputed here.
    pub fn is_surrounded_by_loaded(&self, coord: TileCoord) -> bool {
        let state = self.state();
        if !state.ready || !state.bounds.contains(coord) {
            return false;
        }
        let index = state.index_of(coord);
        state.tiles.get(index).is_some_and(|tile| tile.surrounded)
    }

    /// Bounding box currently covered, once the window has been filled.
    pub fn bounds(&self) -> Option<WindowBounds> {
        let state = self.state();
        state.ready.then_some(state.bounds)
    }

    /// Row-major copy of every live entry, for read-only consumers.
    pub fn snapshot(&self) -> Vec<TileEntry> {
        self.state().tiles.clone()
    }

    /// Counters from recent window activity.
    pub fn stats(&self) -> WindowStats {
        self.state().stats
    }
}

impl WindowState {
    fn index_of(&self, coord: TileCoord) -> usize {
        let x = (coord.x - self.bounds.left) as usize;
        let z = (coord.z - self.bounds.top) as usize;
        x + z * self.width
    }

    fn fill_all(&mut self, center: TileCoord) {
        let (w, h) = (self.width as i32, self.height as i32);
        let (mid_x, mid_z) = (w / 2, h / 2);
        self.tiles.clear();
        for z in 0..h {
            for x in 0..w {
                self.tiles.push(TileEntry::new(TileCoord::new(
                    center.x - (mid_x - x),
                    center.z - (mid_z - z),
                )));
            }
        }
        self.ready = true;
        self.stats.full_fills += 1;
        self.stats.tiles_created_last_move = self.tiles.len();
        self.stats.tiles_reused_last_move = 0;
        self.stats.tiles_total = self.tiles.len();
    }

    fn shift(&mut self, dx: i32, dz: i32, center: TileCoord) {
        self.slide_x(dx);
        self.slide_z(dz);
        let (w, h) = (self.width as i32, self.height as i32);
        let (mid_x, mid_z) = (w / 2, h / 2);

        // Rows exposed by the Z move, across the full width.
        let (z_start, z_end) = if dz > 0 { (h - dz, h) } else { (0, -dz) };
        for z in z_start..z_end {
            for x in 0..w {
                self.write_fresh(x, z, center, mid_x, mid_z);
            }
        }

        // Columns exposed by the X move, across the full height. Corner
        // slots of a diagonal move are written a second time with the
        // same coordinate.
        let (x_start, x_end) = if dx > 0 { (w - dx, w) } else { (0, -dx) };
        for z in 0..h {
            for x in x_start..x_end {
                self.write_fresh(x, z, center, mid_x, mid_z);
            }
        }

        let (adx, adz) = (dx.unsigned_abs() as usize, dz.unsigned_abs() as usize);
        let fresh = adz * self.width + adx * self.height - adx * adz;
        self.stats.shifts += 1;
        self.stats.tiles_created_last_move = fresh;
        self.stats.tiles_reused_last_move = self.tiles.len() - fresh;
        self.stats.tiles_total = self.tiles.len();
    }

    fn write_fresh(&mut self, x: i32, z: i32, center: TileCoord, mid_x: i32, mid_z: i32) {
        let index = (x + z * self.width as i32) as usize;
        self.tiles[index] = TileEntry::new(TileCoord::new(
            center.x - (mid_x - x),
            center.z - (mid_z - z),
        ));
    }

    // Slide the flat buffer by `offset` columns as one contiguous copy.
    // Slots that wrap across a row boundary hold stale entries until the
    // column replacement overwrites them.
    fn slide_x(&mut self, offset: i32) {
        let len = self.tiles.len();
        if offset > 0 {
            let off = offset as usize;
            self.tiles.copy_within(off.., 0);
        } else if offset < 0 {
            let off = offset.unsigned_abs() as usize;
            self.tiles.copy_within(..len - off, off);
        }
    }

    fn slide_z(&mut self, offset: i32) {
        let len = self.tiles.len();
        if offset > 0 {
            let off = offset as usize * self.width;
            self.tiles.copy_within(off.., 0);
        } else if offset < 0 {
            let off = offset.unsigned_abs() as usize * self.width;
            self.tiles.copy_within(..len - off, off);
        }
    }

    fn recompute_bounds(&mut self) {
        let (Some(first), Some(last)) = (self.tiles.first(), self.tiles.last()) else {
            return;
        };
        self.bounds = WindowBounds {
            left: first.coord.x,
            top: first.coord.z,
            right: last.coord.x,
            bottom: last.coord.z,
        };
    }
}
