use crate::{
    AppState,
    access::{self, ADMIN_ONLY, Decision, MANAGER_ONLY, STAFF},
    auth::{self, AuthUser, Viewer},
    config::Env,
    error::{ApiError, ApiResult},
    layout,
    models::{
        CreateEventRequest, Event, EventStatus, LoginRequest, LoginResponse, NewEvent, Role,
        UpdateEventStatusRequest, UserProfile,
    },
    navigation::{self, Navigation, RouteInfo},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{Method, StatusCode, Uri, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use uuid::Uuid;

// --- Helpers ---

/// Runs the access gate for an API call. Unlike page navigation, the API tells
/// "not logged in" (401) apart from "wrong role" (403).
fn require(user: &AuthUser, allowed: &[Role]) -> ApiResult<()> {
    match access::authorize(Some(user.role), allowed) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(reason.into()),
    }
}

fn is_staff(role: Option<Role>) -> bool {
    role.is_some_and(|role| STAFF.contains(&role))
}

fn validate_event(req: &CreateEventRequest) -> ApiResult<()> {
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".into()));
    }
    if let Some(ends_at) = req.ends_at {
        if ends_at < req.starts_at {
            return Err(ApiError::BadRequest("ends_at is before starts_at".into()));
        }
    }
    if let Some(capacity) = req.capacity {
        if capacity <= 0 {
            return Err(ApiError::BadRequest("capacity must be positive".into()));
        }
    }
    Ok(())
}

// --- Page Navigation ---

/// navigate_page
///
/// [Fallback] Every browser navigation that no API route claimed. Resolves the path
/// against the route table for the viewer's role and either serves the HTML shell or
/// redirects (303) to `/login`.
///
/// Unknown `/api/...` paths get a JSON 404 instead of a redirect. Pages only answer
/// GET and HEAD; other methods get 405.
pub async fn navigate_page(viewer: Viewer, method: Method, uri: Uri) -> Response {
    let path = uri.path();
    if path == "/api" || path.starts_with("/api/") {
        return ApiError::NotFound("endpoint").into_response();
    }
    if method != Method::GET && method != Method::HEAD {
        return (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET, HEAD")]).into_response();
    }

    let role = viewer.role();
    match navigation::resolve(path, role) {
        Navigation::Render {
            page,
            layout,
            params,
        } => Html(layout::render_shell(page, layout, &params, role)).into_response(),
        Navigation::Redirect { to, reason, .. } => {
            tracing::debug!(path, ?reason, "redirecting navigation to {}", to);
            Redirect::to(&to).into_response()
        }
    }
}

/// NavigateQuery
///
/// Query parameters for GET /api/navigate.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct NavigateQuery {
    /// The location pathname to resolve, e.g. `/admin/requests`.
    pub path: String,
}

/// get_navigation
///
/// [Public Route] The navigation decision for `path` under the caller's current
/// role, for client-side routers.
#[utoipa::path(
    get,
    path = "/api/navigate",
    params(NavigateQuery),
    responses((status = 200, description = "Navigation outcome", body = Navigation))
)]
pub async fn get_navigation(viewer: Viewer, Query(query): Query<NavigateQuery>) -> Json<Navigation> {
    let path = if query.path.starts_with('/') {
        query.path
    } else {
        format!("/{}", query.path)
    };
    Json(navigation::resolve(&path, viewer.role()))
}

/// get_routes
///
/// [Public Route] The static route table, login branch first.
#[utoipa::path(
    get,
    path = "/api/routes",
    responses((status = 200, description = "Route table", body = [RouteInfo]))
)]
pub async fn get_routes() -> Json<Vec<RouteInfo>> {
    Json(navigation::route_infos())
}

// --- Sessions ---

/// login
///
/// [Public Route] Opens a session for a directory user. The role held by the
/// directory becomes the session's current role. The token is returned in the body
/// and installed as the `session` cookie.
///
/// A given password must match the stored argon2 hash. Omitting it is only accepted
/// in `Env::Local`, for the seeded demo accounts.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Unknown account or bad credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Response> {
    let user = state
        .identity
        .find_by_email(payload.email.trim())
        .await
        .ok_or(ApiError::Unauthenticated)?;

    match payload.password.as_deref() {
        Some(password) => {
            let hash = state
                .identity
                .password_hash(user.id)
                .await
                .ok_or(ApiError::Unauthenticated)?;
            if !auth::verify_password(password, &hash) {
                tracing::info!(user_id = %user.id, "login refused: wrong password");
                return Err(ApiError::Unauthenticated);
            }
        }
        None if state.config.env == Env::Local => {}
        None => {
            tracing::info!(user_id = %user.id, "login refused: password required");
            return Err(ApiError::Unauthenticated);
        }
    }

    let session = state.sessions.open(&user).await;
    let token = auth::issue_token(&state.config.jwt_secret, &session)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let cookie = auth::session_cookie(
        &token,
        state.sessions.ttl_secs(),
        state.config.secure_cookies(),
    );
    let body = LoginResponse {
        token,
        profile: UserProfile {
            id: user.id,
            email: user.email,
            role: user.role,
            session_expires_at: Some(session.expires_at),
        },
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// logout
///
/// [Authenticated Route] Closes the caller's session and clears the cookie. Tokens
/// pointing at the closed session stop working immediately.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses((status = 204, description = "Logged out"))
)]
pub async fn logout(user: AuthUser, State(state): State<AppState>) -> impl IntoResponse {
    if let Some(session_id) = user.session_id {
        state.sessions.close(session_id).await;
    }
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, auth::expired_session_cookie())],
    )
}

/// get_me
///
/// [Authenticated Route] The current user and role.
#[utoipa::path(
    get,
    path = "/api/me",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_me(user: AuthUser, State(state): State<AppState>) -> Json<UserProfile> {
    let session_expires_at = match user.session_id {
        Some(id) => state.sessions.get(id).await.map(|s| s.expires_at),
        None => None,
    };
    Json(UserProfile {
        id: user.id,
        email: user.email,
        role: user.role,
        session_expires_at,
    })
}

// --- Events ---

/// list_events
///
/// [Public Route] Approved events for everyone; admins and event managers also see
/// pending and rejected records.
#[utoipa::path(
    get,
    path = "/api/events",
    responses((status = 200, description = "Events", body = [Event]))
)]
pub async fn list_events(viewer: Viewer, State(state): State<AppState>) -> ApiResult<Json<Vec<Event>>> {
    let mut events = state.events.list().await?;
    if !is_staff(viewer.role()) {
        events.retain(|e| e.status == EventStatus::Approved);
    }
    Ok(Json(events))
}

/// get_event
///
/// [Public Route] A single event. Unapproved events are hidden (404) from non-staff.
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Found", body = Event),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_event(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Event>> {
    let event = state.events.get(id).await?;
    if event.status != EventStatus::Approved && !is_staff(viewer.role()) {
        return Err(ApiError::NotFound("event"));
    }
    Ok(Json(event))
}

/// submit_event_request
///
/// [Public Route] The public event request form. Always creates a `pending` event
/// that lands in the review queue.
#[utoipa::path(
    post,
    path = "/api/events/requests",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Request submitted", body = Event),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn submit_event_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    validate_event(&payload)?;
    let event = state
        .events
        .create(NewEvent {
            request: payload,
            status: EventStatus::Pending,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// create_event
///
/// [eventManager] Creates an event directly, skipping the review queue.
#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Created", body = Event),
        (status = 403, description = "Not an event manager")
    )
)]
pub async fn create_event(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    require(&user, MANAGER_ONLY)?;
    validate_event(&payload)?;
    let event = state
        .events
        .create(NewEvent {
            request: payload,
            status: EventStatus::Approved,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// update_event_status
///
/// [admin, eventManager] Approves or rejects a request from the review queue.
#[utoipa::path(
    put,
    path = "/api/events/{id}/status",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEventStatusRequest,
    responses(
        (status = 200, description = "Updated", body = Event),
        (status = 403, description = "Not staff"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_event_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEventStatusRequest>,
) -> ApiResult<Json<Event>> {
    require(&user, STAFF)?;
    let event = state.events.update_status(id, payload.status).await?;
    Ok(Json(event))
}

/// delete_event
///
/// [admin] Removes an event.
#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_event(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require(&user, ADMIN_ONLY)?;
    state.events.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
