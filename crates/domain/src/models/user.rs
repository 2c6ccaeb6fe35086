use chrono::{DateTime, Utc};
use common::UserId;
use document_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::Entity;

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    #[default]
    User,
    Vendor,
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Lowercased; unique among active users.
    pub email: String,
    pub role: UserRole,
    pub is_suspended: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: &str, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name: name.into(),
            email: normalize_email(email),
            role,
            is_suspended: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Canonical form of an email address used for uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn document_id(&self) -> Uuid {
        self.id.as_uuid()
    }
}

impl Entity for User {
    const NAME: &'static str = "User";

    fn is_active(&self) -> bool {
        self.is_active
    }
}
