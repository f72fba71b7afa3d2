use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that work without a session. Handlers that take `Viewer` still adapt
/// to a session when one is present (e.g. staff see unapproved events).
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe.
        .route("/health", get(|| async { "ok" }))
        // POST /api/login
        // Opens a session and sets the session cookie.
        .route("/api/login", post(handlers::login))
        // GET /api/navigate?path=...
        // The router's decision for a path, as JSON.
        .route("/api/navigate", get(handlers::get_navigation))
        // GET /api/routes
        .route("/api/routes", get(handlers::get_routes))
        // GET /api/events
        // Approved events (all events for staff).
        .route("/api/events", get(handlers::list_events))
        // GET /api/events/{id}
        .route("/api/events/{id}", get(handlers::get_event))
        // POST /api/events/requests
        // The public request form; always lands as `pending`.
        .route("/api/events/requests", post(handlers::submit_event_request))
}
