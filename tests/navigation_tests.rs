use event_portal::{
    access::{ADMIN_ONLY, MANAGER_ONLY, STAFF},
    models::{Page, Role},
    navigation::{
        LOGIN_PATH, Navigation, ROUTE_TABLE, RedirectReason, Target, resolve, route_infos,
        visible_pages,
    },
};

const ALL_ROLES: [Option<Role>; 4] = [
    None,
    Some(Role::Admin),
    Some(Role::EventManager),
    Some(Role::Student),
];

fn assert_login_redirect(nav: &Navigation) {
    assert_eq!(nav.redirect_target(), Some(LOGIN_PATH), "expected redirect, got {nav:?}");
}

// --- Table invariants ---

#[test]
fn test_gated_entries_have_non_empty_role_sets() {
    for entry in ROUTE_TABLE {
        if let Some(roles) = entry.allowed_roles {
            assert!(!roles.is_empty(), "{} is gated with an empty role set", entry.path);
        }
    }
}

#[test]
fn test_wildcard_closes_the_table() {
    let last = ROUTE_TABLE.last().unwrap();
    assert_eq!(last.path, "*");
    assert!(matches!(last.target, Target::Redirect { to: "/login", .. }));
}

#[test]
fn test_table_declares_expected_role_sets() {
    let expected: [(&str, Option<&[Role]>); 24] = [
        ("/public", None),
        ("/student", None),
        ("/request-event", None),
        ("/speakers", None),
        ("/registration/:id", None),
        ("/admin", Some(ADMIN_ONLY)),
        ("/admin/requests", Some(STAFF)),
        ("/event-manager", Some(MANAGER_ONLY)),
        ("/manager/create", Some(MANAGER_ONLY)),
        ("/email-registrants", Some(STAFF)),
        ("/contracts", Some(STAFF)),
        ("/invoices", Some(STAFF)),
        ("/crm", Some(STAFF)),
        ("/resources", Some(STAFF)),
        ("/reports", Some(STAFF)),
        ("/venues", Some(STAFF)),
        ("/breakout-sessions", Some(STAFF)),
        ("/mobile-app", Some(STAFF)),
        ("/security-settings", Some(ADMIN_ONLY)),
        ("/data-migration", Some(ADMIN_ONLY)),
        ("/compliance", Some(ADMIN_ONLY)),
        ("/accessibility-demo", None),
        ("/", None),
        ("*", None),
    ];

    assert_eq!(ROUTE_TABLE.len(), expected.len());
    for (entry, (path, roles)) in ROUTE_TABLE.iter().zip(expected) {
        assert_eq!(entry.path, path);
        assert_eq!(entry.allowed_roles, roles, "role set of {path}");
    }
}

// --- Login branch ---

#[test]
fn test_login_renders_without_layout_for_every_role() {
    for role in ALL_ROLES {
        let nav = resolve("/login", role);
        assert_eq!(nav.page(), Some(Page::Login));
        assert!(!nav.has_layout(), "login must not render the layout ({role:?})");
    }
}

#[test]
fn test_login_ignores_query_string() {
    let nav = resolve("/login?next=/admin", None);
    assert_eq!(nav.page(), Some(Page::Login));
}

#[test]
fn test_login_with_trailing_slash_is_not_the_login_branch() {
    let nav = resolve("/login/", Some(Role::Admin));
    assert_eq!(
        nav,
        Navigation::Redirect {
            to: "/login".to_string(),
            replace: true,
            reason: RedirectReason::Unmatched,
        }
    );
}

// --- Layout branch ---

#[test]
fn test_root_always_redirects_to_login() {
    for role in ALL_ROLES {
        let nav = resolve("/", role);
        assert_login_redirect(&nav);
        assert!(matches!(
            nav,
            Navigation::Redirect {
                replace: true,
                reason: RedirectReason::Declared,
                ..
            }
        ));
    }
}

#[test]
fn test_unknown_paths_redirect_to_login() {
    let paths = [
        "/nope",
        "/admin/users",
        "/registration",
        "/registration/1/extra",
        "/event-manager/create",
        "//admin",
        "",
    ];
    for path in paths {
        for role in ALL_ROLES {
            assert_login_redirect(&resolve(path, role));
        }
    }
}

#[test]
fn test_public_pages_render_for_anonymous_visitors() {
    let cases = [
        ("/public", Page::PublicView),
        ("/student", Page::StudentDashboard),
        ("/request-event", Page::EventRequestForm),
        ("/speakers", Page::SpeakerBios),
        ("/accessibility-demo", Page::AccessibilityDemo),
    ];
    for (path, page) in cases {
        let nav = resolve(path, None);
        assert_eq!(nav.page(), Some(page), "{path}");
        assert!(nav.has_layout());
    }
}

#[test]
fn test_gated_routes_follow_role_membership() {
    for entry in ROUTE_TABLE {
        let (Target::Page(page), Some(allowed)) = (entry.target, entry.allowed_roles) else {
            continue;
        };
        for role in ALL_ROLES {
            let nav = resolve(entry.path, role);
            let permitted = role.is_some_and(|r| allowed.contains(&r));
            if permitted {
                assert_eq!(nav.page(), Some(page), "{} as {role:?}", entry.path);
                assert!(nav.has_layout());
            } else {
                assert_login_redirect(&nav);
            }
        }
    }
}

#[test]
fn test_admin_examples() {
    assert_login_redirect(&resolve("/admin", Some(Role::EventManager)));
    assert_eq!(resolve("/admin", Some(Role::Admin)).page(), Some(Page::AdminDashboard));
    assert_eq!(
        resolve("/event-manager", Some(Role::EventManager)).page(),
        Some(Page::EventManager)
    );
}

#[test]
fn test_denial_reason_distinguishes_anonymous_from_wrong_role() {
    let anonymous = resolve("/crm", None);
    let student = resolve("/crm", Some(Role::Student));

    assert!(matches!(
        anonymous,
        Navigation::Redirect {
            reason: RedirectReason::Unauthenticated,
            ..
        }
    ));
    assert!(matches!(
        student,
        Navigation::Redirect {
            reason: RedirectReason::Forbidden,
            ..
        }
    ));
    // Both land on the same place.
    assert_eq!(anonymous.redirect_target(), student.redirect_target());
}

#[test]
fn test_dynamic_segment_is_captured() {
    match resolve("/registration/42", None) {
        Navigation::Render { page, params, .. } => {
            assert_eq!(page, Page::RegistrationPage);
            assert_eq!(params.get("id").map(String::as_str), Some("42"));
        }
        other => panic!("expected render, got {other:?}"),
    }
}

#[test]
fn test_matching_is_case_insensitive_and_tolerates_trailing_slash() {
    assert_eq!(resolve("/Admin/", Some(Role::Admin)).page(), Some(Page::AdminDashboard));
    assert_eq!(resolve("/CRM", Some(Role::EventManager)).page(), Some(Page::Crm));
}

#[test]
fn test_resolve_is_idempotent() {
    for path in ["/admin", "/crm", "/registration/x", "/", "/nowhere", "/login"] {
        for role in ALL_ROLES {
            assert_eq!(resolve(path, role), resolve(path, role));
        }
    }
}

// --- Derived views ---

#[test]
fn test_visible_pages_hide_gated_and_dynamic_entries() {
    let anonymous: Vec<&str> = visible_pages(None).into_iter().map(|(p, _)| p).collect();
    assert!(anonymous.contains(&"/public"));
    assert!(!anonymous.contains(&"/admin"));
    assert!(!anonymous.contains(&"/registration/:id"));

    let admin: Vec<Page> = visible_pages(Some(Role::Admin)).into_iter().map(|(_, p)| p).collect();
    assert!(admin.contains(&Page::Compliance));
    assert!(!admin.contains(&Page::EventManager));

    let manager: Vec<Page> = visible_pages(Some(Role::EventManager))
        .into_iter()
        .map(|(_, p)| p)
        .collect();
    assert!(manager.contains(&Page::ManagerCreateEvent));
    assert!(!manager.contains(&Page::SecuritySettings));
}

#[test]
fn test_route_infos_start_with_login_branch() {
    let infos = route_infos();
    assert_eq!(infos.len(), ROUTE_TABLE.len() + 1);
    assert_eq!(infos[0].path, "/login");
    assert_eq!(infos[0].page, Some(Page::Login));
    assert!(!infos[0].layout);
    assert!(infos[1..].iter().all(|info| info.layout));

    let root = infos.iter().find(|info| info.path == "/").unwrap();
    assert_eq!(root.redirect_to.as_deref(), Some("/login"));
}

#[test]
fn test_navigation_json_shape() {
    let json = serde_json::to_value(resolve("/crm", Some(Role::Admin))).unwrap();
    assert_eq!(json["kind"], "render");
    assert_eq!(json["page"], "CRM");
    assert_eq!(json["layout"], true);

    let json = serde_json::to_value(resolve("/crm", Some(Role::Student))).unwrap();
    assert_eq!(json["kind"], "redirect");
    assert_eq!(json["to"], "/login");
    assert_eq!(json["reason"], "forbidden");
}
