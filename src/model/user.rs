//! User identity types.
//!
//! This module defines the UserSummary struct and Role enum returned by the
//! authentication endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// User role for permission management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Role {
    /// Regular staff member.
    Employee = 0,
    /// Team manager.
    Manager = 1,
    /// Administrator.
    Admin = 2,
}

impl Role {
    /// Wire representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "Employee",
            Role::Manager => "Manager",
            Role::Admin => "Admin",
        }
    }

    /// Check if this role has at least the required permission level.
    ///
    /// # Examples
    ///
    /// ```
    /// use filevault::Role;
    ///
    /// assert!(Role::Admin.can_access(Role::Manager));
    /// assert!(Role::Manager.can_access(Role::Manager));
    /// assert!(!Role::Employee.can_access(Role::Manager));
    /// ```
    pub fn can_access(&self, required: Role) -> bool {
        *self >= required
    }

    /// Whether the backend serves the activity log to this role.
    pub fn can_view_activity_logs(&self) -> bool {
        self.can_access(Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "employee" => Ok(Role::Employee),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Identity of the logged-in user.
///
/// Replaced wholesale on every login; never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User ID (string or number on the wire).
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Login username.
    pub username: String,
    /// User role.
    pub role: Role,
    /// Email address.
    #[serde(default)]
    pub email: String,
}

impl UserSummary {
    /// Check if this user has at least the required role level.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.can_access(required)
    }

    /// Check if this user is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Payload of the auth-check endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether the server still recognizes the session.
    pub authenticated: bool,
    /// Identity, when the server includes it.
    #[serde(default)]
    pub user: Option<UserSummary>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}
