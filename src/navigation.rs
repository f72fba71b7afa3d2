use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    access::{self, ADMIN_ONLY, Decision, DenyReason, MANAGER_ONLY, STAFF},
    models::{Page, Role},
};

/// The only path rendered without the layout wrapper. Compared exactly.
pub const LOGIN_PATH: &str = "/login";

/// Matches any path. Must stay the last entry of the table.
const WILDCARD: &str = "*";

// --- Route Table ---

/// What a matched route produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Page(Page),
    Redirect {
        to: &'static str,
        reason: RedirectReason,
    },
}

/// RouteEntry
///
/// One static binding from a path pattern to a target. Patterns are `/`-separated
/// literals, `:name` segments that capture exactly one non-empty segment, or the
/// bare wildcard `*`.
#[derive(Debug, Clone, Copy)]
pub struct RouteEntry {
    pub path: &'static str,
    pub target: Target,
    /// `None` means public. A gated entry always carries a non-empty set.
    pub allowed_roles: Option<&'static [Role]>,
}

impl RouteEntry {
    const fn public(path: &'static str, page: Page) -> Self {
        Self {
            path,
            target: Target::Page(page),
            allowed_roles: None,
        }
    }

    const fn gated(path: &'static str, page: Page, roles: &'static [Role]) -> Self {
        Self {
            path,
            target: Target::Page(page),
            allowed_roles: Some(roles),
        }
    }

    const fn redirect(path: &'static str, reason: RedirectReason) -> Self {
        Self {
            path,
            target: Target::Redirect {
                to: LOGIN_PATH,
                reason,
            },
            allowed_roles: None,
        }
    }

    /// Returns the captured parameters when `path` matches this entry.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        match_pattern(self.path, path)
    }

    pub fn is_dynamic(&self) -> bool {
        self.path == WILDCARD || self.path.contains(':')
    }
}

/// The login branch. Kept out of `ROUTE_TABLE` because it is selected by an exact
/// path comparison before any pattern matching happens.
pub const LOGIN_ROUTE: RouteEntry = RouteEntry::public(LOGIN_PATH, Page::Login);

/// Routes rendered inside the layout wrapper, in match order.
pub static ROUTE_TABLE: &[RouteEntry] = &[
    // Public pages
    RouteEntry::public("/public", Page::PublicView),
    RouteEntry::public("/student", Page::StudentDashboard),
    RouteEntry::public("/request-event", Page::EventRequestForm),
    RouteEntry::public("/speakers", Page::SpeakerBios),
    RouteEntry::public("/registration/:id", Page::RegistrationPage),
    // Admin and review queue
    RouteEntry::gated("/admin", Page::AdminDashboard, ADMIN_ONLY),
    RouteEntry::gated("/admin/requests", Page::ReviewRequests, STAFF),
    // Event manager
    RouteEntry::gated("/event-manager", Page::EventManager, MANAGER_ONLY),
    RouteEntry::gated("/manager/create", Page::ManagerCreateEvent, MANAGER_ONLY),
    RouteEntry::gated("/email-registrants", Page::EmailRegistrants, STAFF),
    // Shared tools
    RouteEntry::gated("/contracts", Page::ContractGenerator, STAFF),
    RouteEntry::gated("/invoices", Page::InvoiceManager, STAFF),
    RouteEntry::gated("/crm", Page::Crm, STAFF),
    RouteEntry::gated("/resources", Page::ResourceManagement, STAFF),
    RouteEntry::gated("/reports", Page::Reports, STAFF),
    RouteEntry::gated("/venues", Page::Venues, STAFF),
    RouteEntry::gated("/breakout-sessions", Page::BreakoutSessions, STAFF),
    RouteEntry::gated("/mobile-app", Page::MobileApp, STAFF),
    RouteEntry::gated("/security-settings", Page::SecuritySettings, ADMIN_ONLY),
    RouteEntry::gated("/data-migration", Page::DataMigration, ADMIN_ONLY),
    RouteEntry::gated("/compliance", Page::Compliance, ADMIN_ONLY),
    // Misc
    RouteEntry::public("/accessibility-demo", Page::AccessibilityDemo),
    RouteEntry::redirect("/", RedirectReason::Declared),
    RouteEntry::redirect(WILDCARD, RedirectReason::Unmatched),
];

// --- Resolution ---

/// Why a navigation ended in a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RedirectReason {
    /// The matched entry is itself a redirect (`/`).
    Declared,
    /// Nothing in the table matched.
    Unmatched,
    Unauthenticated,
    Forbidden,
}

impl From<DenyReason> for RedirectReason {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => RedirectReason::Unauthenticated,
            DenyReason::Forbidden => RedirectReason::Forbidden,
        }
    }
}

/// Navigation
///
/// The outcome of one navigation: mount a page (optionally inside the layout) or
/// go somewhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Navigation {
    Render {
        page: Page,
        layout: bool,
        params: BTreeMap<String, String>,
    },
    Redirect {
        to: String,
        replace: bool,
        reason: RedirectReason,
    },
}

impl Navigation {
    pub fn page(&self) -> Option<Page> {
        match self {
            Navigation::Render { page, .. } => Some(*page),
            Navigation::Redirect { .. } => None,
        }
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Navigation::Render { .. } => None,
            Navigation::Redirect { to, .. } => Some(to),
        }
    }

    pub fn has_layout(&self) -> bool {
        matches!(self, Navigation::Render { layout: true, .. })
    }
}

/// resolve
///
/// Maps a URL path and the current role to a `Navigation`. Pure: the same inputs
/// always give the same answer.
///
/// Query strings and fragments are ignored. `/login` is compared exactly and is the
/// only path without the layout; every other path goes through `ROUTE_TABLE`, where
/// gated entries consult `access::authorize` and every refusal becomes a redirect
/// to `/login`.
pub fn resolve(path: &str, role: Option<Role>) -> Navigation {
    let path = pathname(path);

    if path == LOGIN_PATH {
        return Navigation::Render {
            page: Page::Login,
            layout: false,
            params: BTreeMap::new(),
        };
    }

    for entry in ROUTE_TABLE {
        let Some(params) = entry.matches(path) else {
            continue;
        };

        return match entry.target {
            // Declared redirects in the layout branch replace the history entry.
            Target::Redirect { to, reason } => Navigation::Redirect {
                to: to.to_string(),
                replace: true,
                reason,
            },
            Target::Page(page) => {
                let decision = match entry.allowed_roles {
                    None => Decision::Allow,
                    Some(allowed) => access::authorize(role, allowed),
                };
                match decision {
                    Decision::Allow => Navigation::Render {
                        page,
                        layout: true,
                        params,
                    },
                    Decision::Deny(reason) => {
                        tracing::debug!(
                            path,
                            route = entry.path,
                            role = role.map(|r| r.as_str()),
                            ?reason,
                            "navigation refused by access gate"
                        );
                        Navigation::Redirect {
                            to: LOGIN_PATH.to_string(),
                            replace: false,
                            reason: reason.into(),
                        }
                    }
                }
            }
        };
    }

    // The wildcard entry closes the table, so this is only reached if it is removed.
    Navigation::Redirect {
        to: LOGIN_PATH.to_string(),
        replace: true,
        reason: RedirectReason::Unmatched,
    }
}

/// Static pages the role may open, in table order. Used by the navigation panel.
pub fn visible_pages(role: Option<Role>) -> Vec<(&'static str, Page)> {
    ROUTE_TABLE
        .iter()
        .filter(|entry| !entry.is_dynamic())
        .filter_map(|entry| match entry.target {
            Target::Page(page) => Some((entry, page)),
            Target::Redirect { .. } => None,
        })
        .filter(|(entry, _)| match entry.allowed_roles {
            None => true,
            Some(allowed) => access::authorize(role, allowed).is_allowed(),
        })
        .map(|(entry, page)| (entry.path, page))
        .collect()
}

/// Strips the query string and fragment.
fn pathname(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// Splits a path into segments after dropping the leading slash and at most one
/// trailing slash. Returns `None` for relative paths.
fn segments(path: &str) -> Option<Vec<&str>> {
    let rest = path.strip_prefix('/')?;
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    Some(rest.split('/').collect())
}

fn match_pattern(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    if pattern == WILDCARD {
        return Some(BTreeMap::new());
    }

    let expected = segments(pattern)?;
    let actual = segments(path)?;
    if expected.len() != actual.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (want, got) in expected.iter().zip(actual.iter()) {
        if let Some(name) = want.strip_prefix(':') {
            if got.is_empty() {
                return None;
            }
            params.insert(name.to_string(), (*got).to_string());
        } else if !want.eq_ignore_ascii_case(got) {
            return None;
        }
    }
    Some(params)
}

// --- Route listing ---

/// RouteInfo
///
/// Serializable view of a table entry, served by GET /api/routes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RouteInfo {
    pub path: String,
    pub page: Option<Page>,
    pub redirect_to: Option<String>,
    /// Empty for public routes.
    pub allowed_roles: Vec<Role>,
    pub layout: bool,
}

impl RouteInfo {
    fn from_entry(entry: &RouteEntry, layout: bool) -> Self {
        let (page, redirect_to) = match entry.target {
            Target::Page(page) => (Some(page), None),
            Target::Redirect { to, .. } => (None, Some(to.to_string())),
        };
        Self {
            path: entry.path.to_string(),
            page,
            redirect_to,
            allowed_roles: entry.allowed_roles.map(<[Role]>::to_vec).unwrap_or_default(),
            layout,
        }
    }
}

/// The full table, login branch first.
pub fn route_infos() -> Vec<RouteInfo> {
    std::iter::once(RouteInfo::from_entry(&LOGIN_ROUTE, false))
        .chain(ROUTE_TABLE.iter().map(|entry| RouteInfo::from_entry(entry, true)))
        .collect()
}
