use event_portal::{
    access::{ADMIN_ONLY, Decision, DenyReason, MANAGER_ONLY, STAFF, authorize},
    models::Role,
};

#[test]
fn test_member_role_is_allowed() {
    assert_eq!(authorize(Some(Role::Admin), ADMIN_ONLY), Decision::Allow);
    assert_eq!(authorize(Some(Role::EventManager), MANAGER_ONLY), Decision::Allow);
    assert_eq!(authorize(Some(Role::EventManager), STAFF), Decision::Allow);
    assert_eq!(authorize(Some(Role::Admin), STAFF), Decision::Allow);
}

#[test]
fn test_non_member_role_is_forbidden() {
    assert_eq!(
        authorize(Some(Role::EventManager), ADMIN_ONLY),
        Decision::Deny(DenyReason::Forbidden)
    );
    assert_eq!(
        authorize(Some(Role::Admin), MANAGER_ONLY),
        Decision::Deny(DenyReason::Forbidden)
    );
    assert_eq!(
        authorize(Some(Role::Student), STAFF),
        Decision::Deny(DenyReason::Forbidden)
    );
}

#[test]
fn test_missing_role_is_unauthenticated() {
    for allowed in [ADMIN_ONLY, MANAGER_ONLY, STAFF] {
        assert_eq!(
            authorize(None, allowed),
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }
}

#[test]
fn test_empty_allowed_set_denies_everyone() {
    assert!(!authorize(Some(Role::Admin), &[]).is_allowed());
    assert!(!authorize(None, &[]).is_allowed());
}

#[test]
fn test_role_tags_round_trip_through_strings() {
    for role in [Role::Admin, Role::EventManager, Role::Student] {
        assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        assert_eq!(
            serde_json::to_value(role).unwrap(),
            serde_json::Value::String(role.to_string())
        );
    }
    assert!("manager".parse::<Role>().is_err());
    assert!("Admin".parse::<Role>().is_err());
}
