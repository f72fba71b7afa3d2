use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Identity & Roles ---

/// Role
///
/// The permission class attached to a user. Serialized with the exact tags the
/// frontend and the `profiles.role` column use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "eventManager")]
    EventManager,
    #[serde(rename = "student")]
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::EventManager => "eventManager",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a role tag is not one of the known roles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "eventManager" => Ok(Role::EventManager),
            "student" => Ok(Role::Student),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// User
///
/// A directory entry from the `public.profiles` table (or the in-memory demo directory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Session
///
/// A logged-in user with their single current role. Created at login, removed at logout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// LoginRequest
///
/// Input payload for POST /api/login. The password is checked against the
/// directory's argon2 hash. Only `Env::Local` accepts a login without one.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    #[schema(example = "admin@events.local")]
    pub email: String,
    #[serde(default)]
    #[ts(optional)]
    pub password: Option<String>,
}

/// UserProfile
///
/// Output schema for GET /api/me and the login response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    #[ts(type = "string | null")]
    pub session_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    /// Bearer token; also set as the `session` cookie.
    pub token: String,
    pub profile: UserProfile,
}

// --- Pages ---

/// Page
///
/// Every page component the shell can mount. Serialized as the component name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum Page {
    Login,
    PublicView,
    StudentDashboard,
    EventRequestForm,
    SpeakerBios,
    RegistrationPage,
    AdminDashboard,
    ReviewRequests,
    EventManager,
    ManagerCreateEvent,
    EmailRegistrants,
    ContractGenerator,
    InvoiceManager,
    #[serde(rename = "CRM")]
    Crm,
    ResourceManagement,
    Reports,
    Venues,
    BreakoutSessions,
    MobileApp,
    SecuritySettings,
    DataMigration,
    Compliance,
    AccessibilityDemo,
}

impl Page {
    /// The frontend component name mounted for this page.
    pub fn component(&self) -> &'static str {
        match self {
            Page::Login => "Login",
            Page::PublicView => "PublicView",
            Page::StudentDashboard => "StudentDashboard",
            Page::EventRequestForm => "EventRequestForm",
            Page::SpeakerBios => "SpeakerBios",
            Page::RegistrationPage => "RegistrationPage",
            Page::AdminDashboard => "AdminDashboard",
            Page::ReviewRequests => "ReviewRequests",
            Page::EventManager => "EventManager",
            Page::ManagerCreateEvent => "ManagerCreateEvent",
            Page::EmailRegistrants => "EmailRegistrants",
            Page::ContractGenerator => "ContractGenerator",
            Page::InvoiceManager => "InvoiceManager",
            Page::Crm => "CRM",
            Page::ResourceManagement => "ResourceManagement",
            Page::Reports => "Reports",
            Page::Venues => "Venues",
            Page::BreakoutSessions => "BreakoutSessions",
            Page::MobileApp => "MobileApp",
            Page::SecuritySettings => "SecuritySettings",
            Page::DataMigration => "DataMigration",
            Page::Compliance => "Compliance",
            Page::AccessibilityDemo => "AccessibilityDemo",
        }
    }

    /// Human label used by the navigation panel.
    pub fn title(&self) -> &'static str {
        match self {
            Page::Login => "Login",
            Page::PublicView => "Events",
            Page::StudentDashboard => "Student Dashboard",
            Page::EventRequestForm => "Request an Event",
            Page::SpeakerBios => "Speakers",
            Page::RegistrationPage => "Registration",
            Page::AdminDashboard => "Admin Dashboard",
            Page::ReviewRequests => "Review Requests",
            Page::EventManager => "Event Manager",
            Page::ManagerCreateEvent => "Create Event",
            Page::EmailRegistrants => "Email Registrants",
            Page::ContractGenerator => "Contracts",
            Page::InvoiceManager => "Invoices",
            Page::Crm => "CRM",
            Page::ResourceManagement => "Resources",
            Page::Reports => "Reports",
            Page::Venues => "Venues",
            Page::BreakoutSessions => "Breakout Sessions",
            Page::MobileApp => "Mobile App",
            Page::SecuritySettings => "Security Settings",
            Page::DataMigration => "Data Migration",
            Page::Compliance => "Compliance",
            Page::AccessibilityDemo => "Accessibility",
        }
    }
}

// --- Events ---

/// EventStatus
///
/// Lifecycle of an event record. Public requests start as `pending` and are moved
/// to `approved` or `rejected` from the review queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum EventStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Event
///
/// An event record as served by the remote events API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub venue: Option<String>,
    #[ts(type = "string")]
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub capacity: Option<i32>,
    #[serde(default)]
    pub status: EventStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// CreateEventRequest
///
/// Input payload for both the public request form (POST /api/events/requests) and
/// the manager create flow (POST /api/events).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub venue: Option<String>,
    #[ts(type = "string")]
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub capacity: Option<i32>,
}

/// Body sent to the remote API when creating an event; carries the initial status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    #[serde(flatten)]
    pub request: CreateEventRequest,
    pub status: EventStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateEventStatusRequest {
    pub status: EventStatus,
}
