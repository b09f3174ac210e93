use crate::report::{build_report, RoomReport};
use crate::store::EntityStore;
use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// Path of the room report endpoint
pub const COLLECT_ENDPOINT: &str = "/measure/v1/collect";

/// Shared state for the collect API
pub struct CollectAppState {
    pub store: Arc<EntityStore>,
}

/// Create collect API router
pub fn create_collect_router(state: Arc<CollectAppState>) -> Router {
    Router::new()
        .route(COLLECT_ENDPOINT, get(collect))
        .with_state(state)
}

/// GET /measure/v1/collect - Current room temperatures
///
/// Always answers with a report; an empty or stale cache yields fewer (or
/// zero) rooms rather than an error.
async fn collect(State(state): State<Arc<CollectAppState>>) -> Json<RoomReport> {
    let entities = state.store.snapshot();
    let report = build_report(&entities, Utc::now());

    debug!(
        entities = entities.len(),
        rooms = report.rooms.len(),
        "Built room report"
    );

    Json(report)
}
