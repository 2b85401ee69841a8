use std::sync::Arc;

use minimap_common::TileCoord;

use crate::source::ChangeObserver;
use crate::window::TileWindow;

/// Receiver of coordinate-level world change events.
pub trait ChangeSink: Send + Sync {
    /// Record that the world changed at `coord`.
    fn register_change_at(&self, coord: TileCoord);
}

impl<O: ChangeObserver + Send + Sync> ChangeSink for TileWindow<O> {
    fn register_change_at(&self, coord: TileCoord) {
        TileWindow::register_change_at(self, coord);
    }
}

/// Fan-out for inbound world change events.
///
/// The world/event side calls [`WorldUpdateFeed::notify`]; every
/// subscribed sink receives the coordinate. Sinks decide for themselves
/// whether the coordinate is currently interesting, so stale or
/// duplicate notifications are harmless.
#[derive(Default)]
pub struct WorldUpdateFeed {
    sinks: Vec<Arc<dyn ChangeSink>>,
}

impl WorldUpdateFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a sink to future change events.
    pub fn subscribe(&mut self, sink: Arc<dyn ChangeSink>) {
        self.sinks.push(sink);
    }

    /// Number of subscribed sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Forward a change at `coord` to every subscribed sink.
    pub fn notify(&self, coord: TileCoord) {
        for sink in &self.sinks {
            sink.register_change_at(coord);
        }
    }
}
