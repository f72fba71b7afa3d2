use crate::models::{Role, User};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

/// IdentityRepository
///
/// Read access to the user directory. Role assignment happens here: whatever role
/// the directory holds at login becomes the session's role.
///
/// **Send + Sync + async_trait** make `Arc<dyn IdentityRepository>` shareable across
/// Axum's task boundaries.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Option<User>;
    // Emails are compared case-insensitively.
    async fn find_by_email(&self, email: &str) -> Option<User>;
    // PHC-format argon2 hash. `None` when the account has no password set.
    async fn password_hash(&self, id: Uuid) -> Option<String>;
}

/// IdentityState
///
/// The concrete type used to share the directory across the application state.
pub type IdentityState = Arc<dyn IdentityRepository>;

// --- Postgres ---

/// Raw `profiles` row. The role column is free text and is validated on read.
#[derive(Debug, FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    role: String,
}

impl ProfileRow {
    fn into_user(self) -> Option<User> {
        match self.role.parse::<Role>() {
            Ok(role) => Some(User {
                id: self.id,
                email: self.email,
                role,
            }),
            Err(e) => {
                // A profile with an unknown role cannot log in.
                tracing::warn!(user_id = %self.id, "ignoring profile: {}", e);
                None
            }
        }
    }
}

/// PostgresIdentityRepository
///
/// Directory backed by the `public.profiles` table.
pub struct PostgresIdentityRepository {
    pool: PgPool,
}

impl PostgresIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, email, role FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        match row {
            Ok(row) => row.and_then(ProfileRow::into_user),
            Err(e) => {
                tracing::error!("get_user error: {:?}", e);
                None
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Option<User> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, email, role FROM profiles WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;

        match row {
            Ok(row) => row.and_then(ProfileRow::into_user),
            Err(e) => {
                tracing::error!("find_by_email error: {:?}", e);
                None
            }
        }
    }

    async fn password_hash(&self, id: Uuid) -> Option<String> {
        let hash = sqlx::query_scalar::<_, Option<String>>(
            "SELECT password_hash FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        match hash {
            Ok(hash) => hash.flatten(),
            Err(e) => {
                tracing::error!("password_hash error: {:?}", e);
                None
            }
        }
    }
}

// --- In-memory ---

/// InMemoryIdentityRepository
///
/// A fixed directory, used when no database is configured and by the tests.
#[derive(Default)]
pub struct InMemoryIdentityRepository {
    users: HashMap<Uuid, User>,
    password_hashes: HashMap<Uuid, String>,
}

impl InMemoryIdentityRepository {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
            password_hashes: HashMap::new(),
        }
    }

    /// Sets the stored password hash for `id`.
    pub fn with_password_hash(mut self, id: Uuid, hash: impl Into<String>) -> Self {
        self.password_hashes.insert(id, hash.into());
        self
    }

    /// One account per role, with stable ids so local tooling can use `x-user-id`.
    pub fn seeded() -> Self {
        Self::new([
            User {
                id: Uuid::from_u128(1),
                email: "admin@events.local".to_string(),
                role: Role::Admin,
            },
            User {
                id: Uuid::from_u128(2),
                email: "manager@events.local".to_string(),
                role: Role::EventManager,
            },
            User {
                id: Uuid::from_u128(3),
                email: "student@events.local".to_string(),
                role: Role::Student,
            },
        ])
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).cloned()
    }

    async fn find_by_email(&self, email: &str) -> Option<User> {
        self.users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    async fn password_hash(&self, id: Uuid) -> Option<String> {
        self.password_hashes.get(&id).cloned()
    }
}
