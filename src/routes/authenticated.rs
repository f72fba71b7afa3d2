use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Routes available to any logged-in user regardless of role. The router in
/// `lib.rs` wraps these in the auth middleware, so handlers always receive a
/// resolved `AuthUser`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/me
        // The current user and their single current role.
        .route("/api/me", get(handlers::get_me))
        // POST /api/logout
        // Closes the session; the token stops working immediately.
        .route("/api/logout", post(handlers::logout))
}
