use std::sync::Arc;

use rota_core::store::RotaStore;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RotaStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RotaStore>) -> Self {
        Self { store }
    }
}
