//! Application state for the web layer.

use std::sync::Arc;

use crate::engine::Engine;
use crate::store::MemoryStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Board engine over the imported schedule
    pub engine: Arc<Engine<MemoryStore>>,
}

impl AppState {
    pub fn new(engine: Arc<Engine<MemoryStore>>) -> Self {
        Self { engine }
    }
}
