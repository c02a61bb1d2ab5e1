//! Application state shared across handlers.

use std::sync::Arc;

use kundeshop_engine::Engine;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The engine itself holds no mutable
/// state, so no locking is needed between concurrent requests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    engine: Engine,
}

impl AppState {
    /// Create a new application state around a configured engine.
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(AppStateInner { engine }),
        }
    }

    /// Get a reference to the engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.inner.engine
    }
}
