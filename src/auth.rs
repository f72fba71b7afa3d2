use std::convert::Infallible;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    models::{Role, Session},
    repository::IdentityState,
    session::SessionState,
};

/// Name of the cookie carrying the session token for browser navigations.
pub const SESSION_COOKIE: &str = "session";

/// Claims
///
/// Payload of a session token. The token only points at a session; the role is read
/// from the session store on every request, so logging out revokes the token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user id.
    pub sub: Uuid,
    /// Session id (sid): key into the `SessionStore`.
    pub sid: Uuid,
    pub exp: usize,
    pub iat: usize,
}

/// Signs a token for `session`, expiring together with it.
pub fn issue_token(secret: &str, session: &Session) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: session.user_id,
        sid: session.id,
        iat: session.created_at.timestamp().max(0) as usize,
        exp: session.expires_at.timestamp().max(0) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Checks `password` against a PHC-format argon2 hash. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("stored password hash is unreadable: {}", e);
            false
        }
    }
}

/// `Set-Cookie` value installing the session token.
pub fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value clearing the session token.
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// AuthUser
///
/// The resolved identity of a request: who, with which current role, and through
/// which session (`None` for the local `x-user-id` bypass).
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub session_id: Option<Uuid>,
}

/// Finds the raw token: `Authorization: Bearer` first, then the session cookie.
fn extract_token(parts: &Parts) -> Option<&str> {
    if let Some(value) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        return value.strip_prefix("Bearer ");
    }

    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}

/// resolve_user
///
/// Shared by both extractors:
/// 1. Local bypass: in `Env::Local` a directory user id in `x-user-id` is accepted.
/// 2. Token extraction (Bearer header or session cookie).
/// 3. JWT validation, expiry included.
/// 4. Session lookup: the session must still be open and belong to `sub`.
async fn resolve_user<S>(parts: &Parts, state: &S) -> Result<AuthUser, StatusCode>
where
    S: Send + Sync,
    IdentityState: FromRef<S>,
    SessionState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    let config = AppConfig::from_ref(state);

    if config.env == Env::Local {
        let bypass = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok());
        if let Some(user_id) = bypass {
            let identity = IdentityState::from_ref(state);
            if let Some(user) = identity.get_user(user_id).await {
                return Ok(AuthUser {
                    id: user.id,
                    email: user.email,
                    role: user.role,
                    session_id: None,
                });
            }
        }
    }

    let token = extract_token(parts).ok_or(StatusCode::UNAUTHORIZED)?;

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let claims = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| {
            tracing::debug!("rejected session token: {:?}", e.kind());
            StatusCode::UNAUTHORIZED
        })?
        .claims;

    let sessions = SessionState::from_ref(state);
    let session = sessions
        .get(claims.sid)
        .await
        .filter(|session| session.user_id == claims.sub)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    Ok(AuthUser {
        id: session.user_id,
        email: session.email,
        role: session.role,
        session_id: Some(session.id),
    })
}

/// Rejects with 401 when no valid session is attached.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    IdentityState: FromRef<S>,
    SessionState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state).await
    }
}

/// Viewer
///
/// The optional identity behind a page navigation. Never rejects: an anonymous
/// visitor is simply `Viewer(None)`.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<AuthUser>);

impl Viewer {
    pub fn role(&self) -> Option<Role> {
        self.0.as_ref().map(|user| user.role)
    }
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
    IdentityState: FromRef<S>,
    SessionState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(resolve_user(parts, state).await.ok()))
    }
}
