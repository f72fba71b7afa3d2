use std::env;

/// AppConfig
///
/// Holds the application's configuration. Loaded once at startup and shared through
/// `AppState` (pulled into handlers via `FromRef`).
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the local `x-user-id` bypass and log format.
    pub env: Env,
    // Postgres connection string for the profiles directory. When absent the
    // seeded in-memory directory is used (local only).
    pub db_url: Option<String>,
    // Secret used to sign and validate session tokens (HS256).
    pub jwt_secret: String,
    // Base URL of the remote events API, without the trailing `/events`.
    pub events_api_url: String,
    // Timeout applied to every events API call.
    pub events_api_timeout_secs: u64,
    // Lifetime of a login session and its token.
    pub session_ttl_secs: u64,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Directory served under `/assets` (the frontend bundle).
    pub assets_dir: String,
}

/// Env
///
/// The runtime context: developer conveniences in `Local`, hardened behaviour in
/// `Production`.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const LOCAL_JWT_SECRET: &str = "event-portal-local-secret";
const DEFAULT_EVENTS_API_URL: &str = "http://localhost:4000/api";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;
const DEFAULT_EVENTS_API_TIMEOUT_SECS: u64 = 10;
const DEFAULT_ASSETS_DIR: &str = "assets";

impl Default for AppConfig {
    /// Non-panicking configuration for tests: local mode, in-memory directory.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: None,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            events_api_url: DEFAULT_EVENTS_API_URL.to_string(),
            events_api_timeout_secs: DEFAULT_EVENTS_API_TIMEOUT_SECS,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            assets_dir: DEFAULT_ASSETS_DIR.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables (after `.env` has been
    /// applied by the caller).
    ///
    /// # Panics
    /// In production, panics when `JWT_SECRET`, `DATABASE_URL` or `EVENTS_API_URL`
    /// is missing, and on any unparsable numeric setting. The server must not start
    /// half-configured.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let session_ttl_secs = parse_u64("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS);
        let events_api_timeout_secs =
            parse_u64("EVENTS_API_TIMEOUT_SECS", DEFAULT_EVENTS_API_TIMEOUT_SECS);
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let assets_dir = env::var("ASSETS_DIR").unwrap_or_else(|_| DEFAULT_ASSETS_DIR.to_string());

        match env {
            Env::Local => Self {
                env: Env::Local,
                db_url: env::var("DATABASE_URL").ok(),
                jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
                events_api_url: env::var("EVENTS_API_URL")
                    .unwrap_or_else(|_| DEFAULT_EVENTS_API_URL.to_string()),
                events_api_timeout_secs,
                session_ttl_secs,
                bind_addr,
                assets_dir,
            },
            Env::Production => Self {
                env: Env::Production,
                db_url: Some(
                    env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod"),
                ),
                jwt_secret: env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production."),
                events_api_url: env::var("EVENTS_API_URL")
                    .expect("FATAL: EVENTS_API_URL required in prod"),
                events_api_timeout_secs,
                session_ttl_secs,
                bind_addr,
                assets_dir,
            },
        }
    }

    /// Whether session cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.env == Env::Production
    }
}

fn parse_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("FATAL: {key} must be a whole number of seconds, got `{raw}`")),
        Err(_) => default,
    }
}
