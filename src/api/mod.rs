// HTTP API

pub mod collect;

pub use collect::{create_collect_router, CollectAppState, COLLECT_ENDPOINT};

use crate::store::EntityStore;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Full application router with request tracing
pub fn create_app(store: Arc<EntityStore>) -> Router {
    create_collect_router(Arc::new(CollectAppState { store })).layer(TraceLayer::new_for_http())
}
