// src/state.rs
use std::sync::Arc;

use crate::config::JwtConfig;
use crate::store::CatalogStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub jwt: Arc<JwtConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, jwt: JwtConfig) -> Self {
        Self { store, jwt: Arc::new(jwt) }
    }
}
