use event_portal::{
    SessionStore,
    models::{Role, User},
};
use uuid::Uuid;

fn student() -> User {
    User {
        id: Uuid::from_u128(7),
        email: "student@example.com".to_string(),
        role: Role::Student,
    }
}

#[tokio::test]
async fn test_open_session_fixes_identity_and_role() {
    let store = SessionStore::new(600);
    assert_eq!(store.ttl_secs(), 600);
    let session = store.open(&student()).await;

    assert_eq!(session.user_id, Uuid::from_u128(7));
    assert_eq!(session.role, Role::Student);
    assert_eq!((session.expires_at - session.created_at).num_seconds(), 600);

    let fetched = store.get(session.id).await.expect("session should be open");
    assert_eq!(fetched, session);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_each_login_gets_its_own_session() {
    let store = SessionStore::new(600);
    let first = store.open(&student()).await;
    let second = store.open(&student()).await;

    assert_ne!(first.id, second.id);
    assert_eq!(store.len().await, 2);

    // Closing one leaves the other usable.
    assert!(store.close(first.id).await);
    assert!(store.get(first.id).await.is_none());
    assert!(store.get(second.id).await.is_some());
}

#[tokio::test]
async fn test_close_unknown_session_reports_false() {
    let store = SessionStore::new(600);
    assert!(!store.close(Uuid::new_v4()).await);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_zero_ttl_session_is_expired_on_access() {
    let store = SessionStore::new(0);
    let session = store.open(&student()).await;

    assert!(store.get(session.id).await.is_none());
    // Dropped on access.
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_purge_expired_only_drops_expired_sessions() {
    let expired = SessionStore::new(0);
    expired.open(&student()).await;
    expired.open(&student()).await;
    assert_eq!(expired.purge_expired().await, 2);
    assert!(expired.is_empty().await);

    let live = SessionStore::new(600);
    live.open(&student()).await;
    assert_eq!(live.purge_expired().await, 0);
    assert_eq!(live.len().await, 1);
}

#[tokio::test]
async fn test_huge_ttl_is_clamped() {
    let store = SessionStore::new(u64::MAX);
    assert_eq!(store.ttl_secs(), 30 * 24 * 60 * 60);
    let session = store.open(&student()).await;
    assert_eq!(
        (session.expires_at - session.created_at).num_days(),
        30
    );
}
