//! User types.

use serde::{Deserialize, Serialize};
use shopfront_commerce::ids::UserId;
use std::str::FromStr;

use crate::AuthError;

/// Role claim attached to a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular shopper.
    #[default]
    Customer,
    /// Store administrator: manages products and order status.
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Administrator => "administrator",
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "administrator" | "admin" => Ok(Role::Administrator),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

/// The current user as reported by the identity service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum User {
    /// Nobody is signed in.
    #[default]
    Anonymous,
    /// Signed-in user.
    Authenticated {
        id: UserId,
        email: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        role: Role,
    },
}

impl User {
    /// A signed-in customer.
    pub fn customer(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        User::Authenticated {
            id: id.into(),
            email: email.into(),
            name: None,
            role: Role::Customer,
        }
    }

    /// A signed-in administrator.
    pub fn administrator(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        User::Authenticated {
            id: id.into(),
            email: email.into(),
            name: None,
            role: Role::Administrator,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, User::Authenticated { .. })
    }

    /// Get user ID if authenticated.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            User::Authenticated { id, .. } => Some(id),
            User::Anonymous => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            User::Authenticated { email, .. } => Some(email),
            User::Anonymous => None,
        }
    }

    /// Role claim; anonymous users have none.
    pub fn role(&self) -> Option<Role> {
        match self {
            User::Authenticated { role, .. } => Some(*role),
            User::Anonymous => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Administrator)
    }

    /// Display name, falling back to the email.
    pub fn display_name(&self) -> &str {
        match self {
            User::Authenticated { name, email, .. } => name.as_deref().unwrap_or(email),
            User::Anonymous => "Guest",
        }
    }

    /// The user id, or `NotAuthenticated`.
    pub fn require_authenticated(&self) -> Result<&UserId, AuthError> {
        self.user_id().ok_or(AuthError::NotAuthenticated)
    }

    /// The user id of an administrator, or the matching auth error.
    pub fn require_admin(&self) -> Result<&UserId, AuthError> {
        let id = self.require_authenticated()?;
        if self.is_admin() {
            Ok(id)
        } else {
            Err(AuthError::InsufficientPermissions(Role::Administrator.as_str()))
        }
    }
}
