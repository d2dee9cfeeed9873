use std::sync::Arc;

use crate::{
    db::Store,
    services::{providers::CatalogProvider, RecommendationBoard},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub catalog: Arc<dyn CatalogProvider>,
    pub recommendations: Arc<RecommendationBoard>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, catalog: Arc<dyn CatalogProvider>) -> Self {
        Self {
            store,
            catalog,
            recommendations: Arc::new(RecommendationBoard::new()),
        }
    }
}
