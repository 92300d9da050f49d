//! Per-session store: the cart and the live order feed.

use tracing::info;

use shopfront_auth::{AuthError, User};
use shopfront_commerce::cart::{Cart, CartAction, CheckoutSummary};
use shopfront_commerce::checkout::{CheckoutForm, OrderDetails};
use shopfront_commerce::CommerceError;
use shopfront_data::Backend;

use crate::checkout::CheckoutWorkflow;
use crate::config::StoreConfig;
use crate::error::{CheckoutError, NotifierError};
use crate::notifier::OrderStatusNotifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    Active,
    Ended,
}

/// Session state between sign-in and sign-out.
///
/// The cart works for anonymous shoppers too; checkout and the notification
/// feed need a started session.
#[derive(Debug)]
pub struct StoreSession<B> {
    backend: B,
    config: StoreConfig,
    checkout: CheckoutWorkflow<B>,
    cart: Cart,
    user: User,
    notifier: Option<OrderStatusNotifier<B>>,
    state: SessionState,
}

impl<B: Backend + Clone> StoreSession<B> {
    pub fn new(backend: B, config: StoreConfig) -> Self {
        Self {
            checkout: CheckoutWorkflow::new(backend.clone(), config.clone()),
            cart: Cart::new(config.currency),
            backend,
            config,
            user: User::Anonymous,
            notifier: None,
            state: SessionState::Idle,
        }
    }

    /// Begin the session for the signed-in user.
    pub async fn start(&mut self) -> Result<&User, NotifierError> {
        let user = self.backend.current_user().await?;
        user.require_authenticated()?;
        let notifier =
            OrderStatusNotifier::start(self.backend.clone(), self.config.notification_limit)
                .await?;
        info!(user_id = %notifier.user_id(), "Session started");
        self.notifier = Some(notifier);
        self.user = user;
        self.state = SessionState::Active;
        Ok(&self.user)
    }

    /// End the session: the cart is emptied and the feed closed.
    pub fn end(&mut self) {
        if let Some(mut notifier) = self.notifier.take() {
            notifier.close();
        }
        self.cart.clear();
        if let Some(id) = self.user.user_id() {
            info!(user_id = %id, "Session ended");
        }
        self.user = User::Anonymous;
        self.state = SessionState::Ended;
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn dispatch(&mut self, action: CartAction) -> Result<(), CommerceError> {
        self.cart.dispatch(action)
    }

    pub fn summary(&self) -> Result<CheckoutSummary, CheckoutError> {
        self.checkout.summary(&self.cart)
    }

    /// Place the cart as an order.
    pub async fn checkout(&mut self, form: &CheckoutForm) -> Result<OrderDetails, CheckoutError> {
        self.require_active()?;
        self.checkout.place_order(&mut self.cart, form).await
    }

    /// The live order and notification feed.
    pub fn notifier(&mut self) -> Result<&mut OrderStatusNotifier<B>, AuthError> {
        self.require_active()?;
        self.notifier.as_mut().ok_or(AuthError::NotAuthenticated)
    }

    fn require_active(&self) -> Result<(), AuthError> {
        match self.state {
            SessionState::Active => Ok(()),
            SessionState::Idle => Err(AuthError::NotAuthenticated),
            SessionState::Ended => Err(AuthError::SessionEnded),
        }
    }
}
