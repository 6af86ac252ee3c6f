/// Shared application state
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::selection::SelectionStore;
use std::sync::Mutex;

/// State shared across all request handlers.
///
/// The catalog is immutable after the startup load. The selection store is
/// the one mutable resource; all mutations go through its mutex.
pub struct AppState {
    pub catalog: Catalog,
    pub selection: Mutex<SelectionStore>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(catalog: Catalog, selection: SelectionStore, config: AppConfig) -> Self {
        Self {
            catalog,
            selection: Mutex::new(selection),
            config,
        }
    }
}
