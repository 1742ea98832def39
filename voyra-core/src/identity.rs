use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Back-office roles, from widest to narrowest access.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    Provider,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Provider => "PROVIDER",
            Role::User => "USER",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "ADMIN" => Some(Role::Admin),
            "MANAGER" => Some(Role::Manager),
            "PROVIDER" => Some(Role::Provider),
            "USER" => Some(Role::User),
            _ => None,
        }
    }

    /// Managers act on every tour; admins on everything.
    pub fn can_manage_tours(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    pub fn can_resolve_requests(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// A back-office account. Password hashes never leave the store layer in
/// API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for account data access
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        user: &User,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_user(
        &self,
        id: Uuid,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_users(
        &self,
    ) -> Result<Vec<User>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update_user(
        &self,
        id: Uuid,
        user: &User,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn deactivate_user(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
