use std::sync::Arc;

use event_portal::{
    AppConfig, AppState, EventProvider, InMemoryIdentityRepository, MockEventApi, SessionStore,
    create_router,
    models::{LoginResponse, Role, UserProfile},
    navigation::Navigation,
};
use reqwest::{StatusCode, header, redirect};
use serde_json::json;

// --- Setup ---

/// Starts the full application on an ephemeral port and returns its base URL.
async fn spawn_app() -> String {
    let config = AppConfig::default();
    let state = AppState {
        identity: Arc::new(InMemoryIdentityRepository::seeded()),
        sessions: Arc::new(SessionStore::new(config.session_ttl_secs)),
        events: Arc::new(EventProvider::new(Arc::new(MockEventApi::new()))),
        config,
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap()
}

/// Logs in and returns the parsed body together with the `Cookie` header to replay.
async fn login(base: &str, email: &str) -> (LoginResponse, String) {
    let response = client()
        .post(format!("{base}/api/login"))
        .json(&json!({ "email": email }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    let cookie = set_cookie.split(';').next().unwrap().to_string();
    (response.json().await.unwrap(), cookie)
}

fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

// --- Tests ---

#[tokio::test]
async fn test_health_check() {
    let base = spawn_app().await;
    let response = client().get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    // Request ids are generated and echoed back.
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_browser_flow_login_navigate_logout() {
    let base = spawn_app().await;
    let http = client();

    // Anonymous: the admin page sends the browser to the login screen.
    let response = http.get(format!("{base}/admin")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let (body, cookie) = login(&base, "admin@events.local").await;
    assert_eq!(body.profile.role, Role::Admin);

    let response = http
        .get(format!("{base}/admin"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains(r#"data-page="AdminDashboard""#));

    let response = http
        .post(format!("{base}/api/logout"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = http
        .get(format!("{base}/admin"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_bearer_token_drives_navigation_api() {
    let base = spawn_app().await;
    let http = client();
    let (body, _) = login(&base, "Manager@Events.Local").await;

    let me: UserProfile = http
        .get(format!("{base}/api/me"))
        .bearer_auth(&body.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me.role, Role::EventManager);

    let navigation: Navigation = http
        .get(format!("{base}/api/navigate"))
        .query(&[("path", "/event-manager")])
        .bearer_auth(&body.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(navigation.has_layout());

    let navigation: Navigation = http
        .get(format!("{base}/api/navigate"))
        .query(&[("path", "/admin")])
        .bearer_auth(&body.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(navigation.redirect_target(), Some("/login"));
}

#[tokio::test]
async fn test_protected_api_without_session_is_unauthorized() {
    let base = spawn_app().await;
    let response = client().get(format!("{base}/api/me")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
