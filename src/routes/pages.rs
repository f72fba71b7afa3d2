use crate::{AppState, handlers};
use axum::Router;

/// Pages Router Module
///
/// Page paths are not registered with axum one by one: the static route table in
/// `navigation` owns them, so the whole page surface is a single fallback. Anything
/// the API routers did not claim is resolved there, which is also what makes the
/// `*` entry (redirect to `/login`) work.
pub fn page_routes() -> Router<AppState> {
    Router::new().fallback(handlers::navigate_page)
}
