use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{post, put},
};

/// Staff Router Module
///
/// Event writes. Every route here requires a session (auth middleware) and then a
/// specific role set, checked in the handler with `access::authorize`:
///
/// - POST   /api/events             eventManager
/// - PUT    /api/events/{id}/status admin, eventManager
/// - DELETE /api/events/{id}        admin
pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/api/events", post(handlers::create_event))
        .route("/api/events/{id}/status", put(handlers::update_event_status))
        .route("/api/events/{id}", axum::routing::delete(handlers::delete_event))
}
