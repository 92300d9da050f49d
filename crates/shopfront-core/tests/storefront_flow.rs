//! End-to-end: browse, check out, ship, get notified.

use std::sync::Arc;

use shopfront_auth::User;
use shopfront_commerce::prelude::*;
use shopfront_core::{
    CatalogService, OrderAdmin, OrderStatusNotifier, SeedOutcome, StoreConfig, StoreSession,
};
use shopfront_data::{Backend, MemoryBackend};

fn draft(name: &str, cents: i64) -> ProductDraft {
    ProductDraft {
        name: name.into(),
        price: Money::new(cents, Currency::USD),
        original_price: Money::new(cents, Currency::USD),
        discount: 0,
        description: String::new(),
        images: vec![],
        category: "Electronics".into(),
        in_stock: 10,
    }
}

fn form() -> CheckoutForm {
    CheckoutForm {
        shipping: ShippingDetails {
            phone: "555-0100".into(),
            email: None,
            address: "1 Main St".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            postal_code: "62701".into(),
        },
        payment_method: PaymentMethod::CashOnDelivery,
    }
}

#[tokio::test]
async fn test_checkout_then_status_updates_notify_customer() {
    let backend = Arc::new(MemoryBackend::new());
    let config = StoreConfig::default();

    let catalog = CatalogService::new(Arc::clone(&backend), &config);
    let seeded = catalog
        .seed_if_empty(vec![draft("Cable", 1000), draft("Adapter", 500)])
        .await
        .unwrap();
    assert_eq!(seeded, SeedOutcome::Seeded(2));
    let products = catalog.list_products().await.unwrap();

    backend
        .sign_in(User::customer("cust-1", "jo@example.com"))
        .unwrap();
    let mut session = StoreSession::new(Arc::clone(&backend), config.clone());
    session.start().await.unwrap();
    session
        .dispatch(CartAction::AddItem {
            product: products[0].product.clone(),
            quantity: 2,
        })
        .unwrap();
    session
        .dispatch(CartAction::AddItem {
            product: products[1].product.clone(),
            quantity: 1,
        })
        .unwrap();

    let placed = session.checkout(&form()).await.unwrap();
    assert_eq!(placed.order.total.to_string(), "$30.99");
    assert!(session.cart().is_empty());
    let order_id = placed.order.id.clone();

    backend
        .sign_in(User::administrator("ops", "ops@example.com"))
        .unwrap();
    let admin = OrderAdmin::new(Arc::clone(&backend));
    for status in [
        OrderStatus::Processing,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        admin.update_status(&order_id, status).await.unwrap();
    }

    let notifier = session.notifier().unwrap();
    let notices = notifier.drain();
    assert_eq!(
        notices,
        vec![
            FeedNotice::Toast("Your order is now being processed".into()),
            FeedNotice::Toast("Great news! Your order has been shipped".into()),
            FeedNotice::Toast("Your order has been delivered successfully".into()),
        ]
    );
    assert_eq!(notifier.unread_count(), 3);
    assert_eq!(notifier.orders()[0].status, OrderStatus::Delivered);

    let stored = backend
        .list_notifications(&UserId::new("cust-1"), 10)
        .await
        .unwrap();
    assert_eq!(stored.len(), 3);
}

#[tokio::test]
async fn test_duplicate_order_event_is_idempotent() {
    let backend = Arc::new(MemoryBackend::new());
    backend
        .sign_in(User::customer("cust-1", "jo@example.com"))
        .unwrap();
    let order = backend
        .insert_order(shopfront_data::NewOrder {
            user_id: UserId::new("cust-1"),
            total: Money::new(3099, Currency::USD),
            payment_method: PaymentMethod::CashOnDelivery,
            shipping_address: "1 Main St, Springfield, IL - 62701".into(),
            phone: "555-0100".into(),
            status: OrderStatus::Pending,
        })
        .await
        .unwrap();

    let mut notifier = OrderStatusNotifier::start(Arc::clone(&backend), 10)
        .await
        .unwrap();
    let mut shipped = order.clone();
    shipped.status = OrderStatus::Shipped;

    notifier.apply(ChangeEvent::OrderUpdated(shipped.clone()));
    let once = notifier.feed().clone();
    notifier.apply(ChangeEvent::OrderUpdated(shipped));
    assert_eq!(notifier.feed(), &once);
    assert_eq!(notifier.orders().len(), 1);
}

#[tokio::test]
async fn test_verified_review_updates_rating() {
    let backend = Arc::new(MemoryBackend::new());
    let config = StoreConfig::default();
    let catalog = CatalogService::new(Arc::clone(&backend), &config);
    catalog
        .seed_if_empty(vec![draft("Cable", 1000)])
        .await
        .unwrap();
    let product = catalog.list_products().await.unwrap()[0].product.clone();

    backend
        .sign_in(User::customer("cust-1", "jo@example.com"))
        .unwrap();
    let mut session = StoreSession::new(Arc::clone(&backend), config.clone());
    session.start().await.unwrap();
    session
        .dispatch(CartAction::AddItem {
            product: product.clone(),
            quantity: 1,
        })
        .unwrap();
    session.checkout(&form()).await.unwrap();

    catalog.submit_review(&product.id, 4, "Solid").await.unwrap();
    let detail = catalog.product_detail(&product.id).await.unwrap();
    assert_eq!(detail.product.rating.count, 1);
    assert_eq!(detail.product.rating.average, 4.0);
}
