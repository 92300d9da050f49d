//! Identity for the storefront.
//!
//! The hosted backend owns sign-in; this crate models what it hands back:
//! the current user and a role claim.

mod error;
mod identity;
mod user;

pub use error::AuthError;
pub use identity::{IdentityProvider, StaticIdentity};
pub use user::{Role, User};
