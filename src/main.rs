use event_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    events::{EventProvider, RemoteEventApi},
    repository::{IdentityState, InMemoryIdentityRepository, PostgresIdentityRepository},
    session::SessionStore,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// How often expired sessions are swept from the store.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// main
///
/// Loads configuration, initializes logging, builds the identity directory, the
/// session store and the event provider, then serves the router.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast in production)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "event_portal=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Identity directory: Postgres when configured, seeded demo accounts otherwise.
    let identity: IdentityState = match &config.db_url {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");
            Arc::new(PostgresIdentityRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory demo directory");
            Arc::new(InMemoryIdentityRepository::seeded())
        }
    };

    // 4. Sessions, swept periodically.
    let sessions = Arc::new(SessionStore::new(config.session_ttl_secs));
    let sweeper = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let purged = sweeper.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "expired sessions purged");
            }
        }
    });

    // 5. Event provider. A cold cache is fine: the first listing loads it.
    let api = RemoteEventApi::new(
        &config.events_api_url,
        Duration::from_secs(config.events_api_timeout_secs),
    )
    .expect("FATAL: Failed to build the events API client.");
    let events = Arc::new(EventProvider::new(Arc::new(api)));
    if let Err(e) = events.refresh().await {
        tracing::warn!("initial event load failed, will retry on first request: {}", e);
    }

    // 6. State, router, server.
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState {
        identity,
        sessions,
        events,
        config,
    };
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated.");
}
