//! User model with tag-based roles and the reporting hierarchy.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Role tag carried in `users.roles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[serde(rename = "LEADGEN")]
    LeadGen,
    Fse,
    Manager,
    Hod,
    Operations,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeadGen => "LEADGEN",
            Self::Fse => "FSE",
            Self::Manager => "MANAGER",
            Self::Hod => "HOD",
            Self::Operations => "OPERATIONS",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LEADGEN" | "LEAD_GEN" => Ok(Self::LeadGen),
            "FSE" => Ok(Self::Fse),
            "MANAGER" => Ok(Self::Manager),
            "HOD" => Ok(Self::Hod),
            "OPERATIONS" | "OPS" => Ok(Self::Operations),
            "ADMIN" => Ok(Self::Admin),
            other => Err(format!("unknown role tag: {other}")),
        }
    }
}

/// Set of role tags held by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<UserRole>);

impl RoleSet {
    /// Parse raw tags, skipping anything unrecognised.
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        Self(tags.iter().filter_map(|t| t.as_ref().parse().ok()).collect())
    }

    pub fn has(&self, role: UserRole) -> bool {
        self.0.contains(&role)
    }

    pub fn has_any(&self, roles: &[UserRole]) -> bool {
        roles.iter().any(|r| self.0.contains(r))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_tags(&self) -> Vec<String> {
        self.0.iter().map(|r| r.as_str().to_string()).collect()
    }
}

impl FromIterator<UserRole> for RoleSet {
    fn from_iter<I: IntoIterator<Item = UserRole>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Full user row from database (includes password_hash - never serialize to API).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub roles: Vec<String>,
    pub manager_id: Option<Uuid>,
    pub is_active: bool,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn role_set(&self) -> RoleSet {
        RoleSet::from_tags(&self.roles)
    }
}

/// User response DTO - excludes password_hash and internal fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub roles: RoleSet,
    pub manager_id: Option<Uuid>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        let roles = u.role_set();
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            roles,
            manager_id: u.manager_id,
            is_active: u.is_active,
            last_login: u.last_login,
            created_at: u.created_at,
        }
    }
}

/// Compact row used by team listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub manager_id: Option<Uuid>,
    pub is_active: bool,
}

impl TeamMember {
    pub fn role_set(&self) -> RoleSet {
        RoleSet::from_tags(&self.roles)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub roles: Vec<UserRole>,
    pub manager_id: Option<Uuid>,
}
