//! Account domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_STUDENT};

/// Account roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => Role::Admin,
            _ => Role::Student,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "{}", ROLE_ADMIN),
            Role::Student => write!(f, "{}", ROLE_STUDENT),
        }
    }
}

/// Account domain entity.
///
/// The username is immutable after creation (it doubles as the student
/// identifier for student accounts). The digest never leaves the process.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_digest: String,
    pub role: Role,
    /// Set until the seeded default password is changed
    pub first_login: bool,
    /// Linked student record for STUDENT accounts
    pub student_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Account summary safe to return to clients (no digest)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    /// Login name; equals the student identifier for student accounts
    #[schema(example = "CS2024001")]
    pub username: String,
    #[schema(example = "STUDENT")]
    pub role: Role,
    /// True while the seeded default password is still in effect
    pub first_login: bool,
    pub student_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            role: account.role,
            first_login: account.first_login,
            student_id: account.student_id,
            created_at: account.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::from(ROLE_ADMIN), Role::Admin);
        assert_eq!(Role::from(ROLE_STUDENT), Role::Student);
        assert_eq!(Role::Admin.to_string(), ROLE_ADMIN);
        assert_eq!(Role::Student.to_string(), ROLE_STUDENT);
    }

    #[test]
    fn unknown_role_defaults_to_student() {
        assert_eq!(Role::from("whatever"), Role::Student);
    }
}
