//! Authentication errors.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No signed-in user.
    #[error("not signed in")]
    NotAuthenticated,

    /// Signed in but lacking the required role.
    #[error("insufficient permissions: {0} role required")]
    InsufficientPermissions(&'static str),

    /// Unknown role claim.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// The session was ended by sign-out.
    #[error("session ended")]
    SessionEnded,

    /// The identity service could not be reached.
    #[error("identity unavailable: {0}")]
    Unavailable(String),
}

impl AuthError {
    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AuthError::NotAuthenticated | AuthError::SessionEnded)
    }

    /// Check if this is a permission error.
    pub fn is_permission_error(&self) -> bool {
        matches!(self, AuthError::InsufficientPermissions(_))
    }
}
