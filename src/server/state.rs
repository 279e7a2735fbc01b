//! Application state shared across handlers.

use crate::config::Config;
use crate::library::BookStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Book folders and their record cache.
    store: Arc<BookStore>,
}

impl AppState {
    /// Create state with a store over the configured library root.
    pub fn new(config: Config) -> Self {
        let store = BookStore::new(&config.library.root, config.library.cache_capacity);
        Self::with_store(config, store)
    }

    /// Create state around an existing store.
    pub fn with_store(config: Config, store: BookStore) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }

    /// Book store.
    pub fn store(&self) -> &BookStore {
        &self.store
    }
}
