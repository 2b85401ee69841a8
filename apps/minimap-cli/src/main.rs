use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use clap::{Parser, Subcommand};
use glam::Vec3;
use tracing_subscriber::EnvFilter;

use minimap_cache::{
    ChangeObserver, SourceError, TileEntry, TileSource, TileStatus, TileWindow, WindowBounds,
    WindowConfig, WorldUpdateFeed,
};
use minimap_common::{DimensionId, TileCoord};

#[derive(Parser)]
#[command(name = "minimap-cli", about = "CLI driver for the minimap tile window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info
    Info,
    /// Drive an observer on a seeded walk and report cache activity
    Walk {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "64")]
        steps: u64,
        /// Seed for the walk and the synthetic terrain
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Window width in tiles
        #[arg(long, default_value = "9")]
        width: usize,
        /// Window height in tiles
        #[arg(long, default_value = "9")]
        height: usize,
        /// View distance of the synthetic terrain source, in cells
        #[arg(long, default_value = "3")]
        view_distance: i32,
    },
    /// Fill a window once and print it as an ASCII tile map
    Show {
        /// Window width in tiles
        #[arg(long, default_value = "11")]
        width: usize,
        /// Window height in tiles
        #[arg(long, default_value = "7")]
        height: usize,
        /// View distance of the synthetic terrain source, in cells
        #[arg(long, default_value = "4")]
        view_distance: i32,
        /// Seed for the synthetic terrain
        #[arg(long, default_value = "7")]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("minimap-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("cache: {}", minimap_cache::crate_info());
        }
        Commands::Walk {
            steps,
            seed,
            width,
            height,
            view_distance,
        } => run_walk(steps, seed, width, height, view_distance),
        Commands::Show {
            width,
            height,
            view_distance,
            seed,
        } => run_show(width, height, view_distance, seed),
    }

    Ok(())
}

/// Splitmix64 step, used to derive deterministic walk decisions and
/// tile checksums from the seed.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Stand-in terrain source for the demos.
///
/// Tiles within `view_distance` cells of the observer count as loaded,
/// mimicking a server streaming chunks around the player. Regeneration
/// produces a checksum derived from the seed and coordinate.
struct DemoSource {
    seed: u64,
    view_distance: i32,
    observer_cell: TileCoord,
    regenerated: u64,
}

impl DemoSource {
    fn new(seed: u64, view_distance: i32) -> Self {
        Self {
            seed,
            view_distance,
            observer_cell: TileCoord::new(0, 0),
            regenerated: 0,
        }
    }
}

impl TileSource for DemoSource {
    type Content = u64;

    fn is_tile_loaded(&self, coord: TileCoord) -> bool {
        (coord.x - self.observer_cell.x).abs() <= self.view_distance
            && (coord.z - self.observer_cell.z).abs() <= self.view_distance
    }

    fn regenerate(&mut self, coord: TileCoord) -> Result<u64, SourceError> {
        if !self.is_tile_loaded(coord) {
            return Err(SourceError::Unavailable(coord));
        }
        self.regenerated += 1;
        Ok(splitmix64(
            self.seed ^ ((coord.x as u64) << 32) ^ u64::from(coord.z as u32),
        ))
    }
}

/// Counts observer notifications; the render side of the demo.
#[derive(Default)]
struct EventCounter {
    notifications: AtomicUsize,
}

impl ChangeObserver for EventCounter {
    fn tile_changed(&self, coord: TileCoord, status: TileStatus) {
        tracing::debug!(?coord, ?status, "tile changed");
        self.notifications.fetch_add(1, Ordering::Relaxed);
    }
}

/// Render the window as one glyph per tile.
///
/// `!` modified, `#` surrounded, `+` loaded, `.` unloaded.
fn render_window(bounds: WindowBounds, tiles: &[TileEntry]) -> String {
    let width = (bounds.right - bounds.left + 1) as usize;
    let mut out = String::new();
    for row in tiles.chunks(width) {
        for tile in row {
            let glyph = if tile.is_modified() {
                '!'
            } else if tile.is_surrounded() {
                '#'
            } else if tile.is_loaded() {
                '+'
            } else {
                '.'
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

fn run_walk(steps: u64, seed: u64, width: usize, height: usize, view_distance: i32) {
    let config = WindowConfig {
        width,
        height,
        cell_size: 16.0,
    };
    let cell_size = config.cell_size;
    let counter = Arc::new(EventCounter::default());
    let window = Arc::new(TileWindow::new(config, counter.clone()));
    let mut feed = WorldUpdateFeed::new();
    feed.subscribe(window.clone());

    let mut source = DemoSource::new(seed, view_distance);
    let dimension = DimensionId::new();
    let mut position = Vec3::ZERO;
    let mut rng = seed;

    for step in 0..steps {
        rng = splitmix64(rng);
        match rng % 4 {
            0 => position.x += cell_size,
            1 => position.x -= cell_size,
            2 => position.z += cell_size,
            _ => position.z -= cell_size,
        }
        // An occasional long teleport exercises the full-fill path.
        if step % 16 == 15 {
            position.x += cell_size * (width as f32 + 2.0);
        }

        source.observer_cell = window.cell_at(position);
        window.center_on(dimension, position);

        if let Some(bounds) = window.bounds() {
            rng = splitmix64(rng);
            let x = bounds.left + (rng % width as u64) as i32;
            let z = bounds.top + ((rng >> 16) % height as u64) as i32;
            feed.notify(TileCoord::new(x, z));
        }
        if step % 7 == 0 {
            // Stale notification far outside the window; must be ignored.
            feed.notify(TileCoord::new(1 << 20, 1 << 20));
        }

        window.scan_for_changes(&mut source);
        window.scan_for_surrounded();
    }

    let stats = window.stats();
    println!("Walk complete: steps={steps}, seed={seed}");
    println!(
        "  window: {width}x{height} tiles, full fills={}, shifts={}",
        stats.full_fills, stats.shifts
    );
    println!(
        "  last move: {} reused, {} created",
        stats.tiles_reused_last_move, stats.tiles_created_last_move
    );
    println!(
        "  notifications={}, tiles regenerated={}",
        counter.notifications.load(Ordering::Relaxed),
        source.regenerated
    );
    if let Some(bounds) = window.bounds() {
        println!("Final window:");
        print!("{}", render_window(bounds, &window.snapshot()));
    }
}

fn run_show(width: usize, height: usize, view_distance: i32, seed: u64) {
    let config = WindowConfig {
        width,
        height,
        cell_size: 16.0,
    };
    let window = Arc::new(TileWindow::new(config, ()));
    let mut feed = WorldUpdateFeed::new();
    feed.subscribe(window.clone());

    let mut source = DemoSource::new(seed, view_distance);
    window.center_on(DimensionId::new(), Vec3::ZERO);
    window.scan_for_changes(&mut source);
    window.scan_for_surrounded();

    // World edits that have not been rescanned yet show up as modified.
    feed.notify(TileCoord::new(1, 0));
    feed.notify(TileCoord::new(-1, -1));

    let bounds = window.bounds().expect("window was filled above");
    println!(
        "Window {width}x{height} covering ({}, {}) .. ({}, {}):",
        bounds.left, bounds.top, bounds.right, bounds.bottom
    );
    print!("{}", render_window(bounds, &window.snapshot()));
    println!("legend: '!' modified, '#' surrounded, '+' loaded, '.' unloaded");

    let stats = window.stats();
    println!(
        "tiles={}, changed in last scan={}",
        stats.tiles_total, stats.tiles_changed_last_scan
    );
}
