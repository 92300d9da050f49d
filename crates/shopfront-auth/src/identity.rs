//! Identity capability of the hosted backend.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::{AuthError, User};

/// Source of the current user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, or `User::Anonymous`.
    async fn current_user(&self) -> Result<User, AuthError>;
}

#[async_trait]
impl<T: IdentityProvider + ?Sized> IdentityProvider for Arc<T> {
    async fn current_user(&self) -> Result<User, AuthError> {
        (**self).current_user().await
    }
}

/// Identity held in process, switched by `sign_in`/`sign_out`.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    user: RwLock<User>,
}

impl StaticIdentity {
    pub fn new(user: User) -> Self {
        Self {
            user: RwLock::new(user),
        }
    }

    pub fn sign_in(&self, user: User) -> Result<(), AuthError> {
        let mut current = self
            .user
            .write()
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        *current = user;
        Ok(())
    }

    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_in(User::Anonymous)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user(&self) -> Result<User, AuthError> {
        self.user
            .read()
            .map(|u| u.clone())
            .map_err(|e| AuthError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let identity = StaticIdentity::default();
        assert_eq!(identity.current_user().await.unwrap(), User::Anonymous);

        identity.sign_in(User::customer("u1", "a@b.c")).unwrap();
        assert!(identity.current_user().await.unwrap().is_authenticated());

        identity.sign_out().unwrap();
        assert!(!identity.current_user().await.unwrap().is_authenticated());
    }
}
