use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Navigation core: the route table, the access gate and the shell renderer.
pub mod access;
pub mod layout;
pub mod navigation;

// State providers and the services around them.
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod session;

// Routing segregation (Public, Authenticated, Staff, Pages).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, pages, public, staff};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use events::{EventApi, EventProvider, EventProviderState, MockEventApi, RemoteEventApi};
pub use repository::{IdentityState, InMemoryIdentityRepository, PostgresIdentityRepository};
pub use session::{SessionState, SessionStore};

/// ApiDoc
///
/// OpenAPI document for the JSON API, served at `/api-docs/openapi.json`. Page paths
/// are not listed; they live in the route table (see GET /api/routes).
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_navigation, handlers::get_routes, handlers::login, handlers::logout,
        handlers::get_me, handlers::list_events, handlers::get_event,
        handlers::submit_event_request, handlers::create_event, handlers::update_event_status,
        handlers::delete_event
    ),
    components(
        schemas(
            models::Role, models::Page, models::User, models::UserProfile, models::LoginRequest,
            models::LoginResponse, models::Event, models::EventStatus, models::CreateEventRequest,
            models::UpdateEventStatusRequest, navigation::Navigation, navigation::RedirectReason,
            navigation::RouteInfo, error::ErrorBody,
        )
    ),
    tags(
        (name = "event-portal", description = "Event Portal shell and API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The explicit replacement for process-wide providers: identity directory, login
/// sessions, event cache and configuration, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Identity provider: the user directory consulted at login.
    pub identity: IdentityState,
    /// Role provider: open sessions, each holding the user's current role.
    pub sessions: SessionState,
    /// Event data provider: cached records from the remote events API.
    pub events: EventProviderState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for IdentityState {
    fn from_ref(app_state: &AppState) -> IdentityState {
        app_state.identity.clone()
    }
}

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for EventProviderState {
    fn from_ref(app_state: &AppState) -> EventProviderState {
        app_state.events.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Rejects requests without a valid session (401) before they reach the handler, by
/// requiring the `AuthUser` extractor to succeed.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies middleware and registers the state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");
    let assets = ServeDir::new(&state.config.assets_dir);

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public API: no middleware.
        .merge(public::public_routes())
        // Session-only API.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Staff API: session first, role set checked per handler.
        .merge(
            staff::staff_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Frontend bundle referenced by the HTML shell.
        .nest_service("/assets", assets)
        // Everything else is a page navigation.
        .merge(pages::page_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for every request, tagged with the `x-request-id` so all log lines of one
/// request correlate.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
