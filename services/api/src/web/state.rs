//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use trivia_core::export::ContentExporter;
use trivia_core::ports::{ContentStore, SnapshotWriter};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub exporter: ContentExporter,
}

impl AppState {
    /// Wires the export operation to the same store the management routes use.
    pub fn new(store: Arc<dyn ContentStore>, writer: Arc<dyn SnapshotWriter>) -> Self {
        let exporter = ContentExporter::new(store.clone(), writer);
        Self { store, exporter }
    }
}
