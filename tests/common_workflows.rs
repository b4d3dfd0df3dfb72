//! Integration tests for common subscription workflows.
//!
//! These tests drive the registry the way a bus-management layer does:
//! subscribe, look up handlers for an incoming event name, unsubscribe.

use armature_eventbus::prelude::*;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio_test::{assert_err, assert_ok};

// =============================================================================
// Fixtures
// =============================================================================

struct OrderCreated;
impl IntegrationEvent for OrderCreated {}

struct OrderCancelled;
impl IntegrationEvent for OrderCancelled {}

struct PaymentSucceededIntegrationEvent;
impl IntegrationEvent for PaymentSucceededIntegrationEvent {}

macro_rules! handler {
    ($name:ident: $($event:ty),+) => {
        struct $name;
        $(
            #[async_trait]
            impl IntegrationEventHandler<$event> for $name {
                async fn handle(&self, _event: &$event) -> Result<(), EventHandlerError> {
                    Ok(())
                }
            }
        )+
    };
}

handler!(H1: OrderCreated, OrderCancelled, PaymentSucceededIntegrationEvent);
handler!(H2: OrderCreated);

fn collect_removals(manager: &InMemorySubscriptionManager) -> Arc<Mutex<Vec<String>>> {
    let removed = Arc::new(Mutex::new(Vec::new()));
    let sink = removed.clone();
    manager.on_event_removed(move |key| sink.lock().unwrap().push(key.to_string()));
    removed
}

fn handler_names(handlers: &[SubscriptionInfo]) -> Vec<&'static str> {
    handlers.iter().map(|s| s.handler_type().name()).collect()
}

// =============================================================================
// Subscribe / Unsubscribe Lifecycle
// =============================================================================

#[test]
fn test_order_created_lifecycle() {
    let mut manager = InMemorySubscriptionManager::default();
    let removed = collect_removals(&manager);

    assert_ok!(manager.add_subscription::<OrderCreated, H1>());
    assert!(manager.has_subscriptions_for_event_key("OrderCreated"));

    assert_ok!(manager.add_subscription::<OrderCreated, H2>());
    let handlers = assert_ok!(manager.get_handlers_for_event_key("OrderCreated"));
    assert_eq!(handler_names(handlers), vec!["H1", "H2"]);

    assert!(manager.remove_subscription::<OrderCreated, H1>());
    assert!(manager.has_subscriptions_for_event_key("OrderCreated"));
    let handlers = assert_ok!(manager.get_handlers_for_event_key("OrderCreated"));
    assert_eq!(handler_names(handlers), vec!["H2"]);
    assert!(removed.lock().unwrap().is_empty());

    assert!(manager.remove_subscription::<OrderCreated, H2>());
    assert!(!manager.has_subscriptions_for_event_key("OrderCreated"));
    assert!(manager.is_empty());
    assert_eq!(*removed.lock().unwrap(), vec!["OrderCreated".to_string()]);
}

#[test]
fn test_add_then_remove_round_trip() {
    let mut manager = InMemorySubscriptionManager::default();

    assert_ok!(manager.add_subscription::<OrderCancelled, H1>());
    assert!(manager.remove_subscription::<OrderCancelled, H1>());

    assert!(!manager.has_subscriptions_for_event::<OrderCancelled>());
    assert!(manager.is_empty());
    assert_eq!(manager.get_event_type_by_name("OrderCancelled"), Ok(None));
}

#[test]
fn test_duplicate_keeps_single_handler() {
    let mut manager = InMemorySubscriptionManager::default();

    assert_ok!(manager.add_subscription::<OrderCreated, H1>());
    let err = assert_err!(manager.add_subscription::<OrderCreated, H1>());

    assert!(err.is_duplicate());
    assert_eq!(manager.handler_count("OrderCreated"), 1);
}

#[test]
fn test_removing_unregistered_pair_is_noop() {
    let mut manager = InMemorySubscriptionManager::default();
    let removed = collect_removals(&manager);
    assert_ok!(manager.add_subscription::<OrderCancelled, H1>());

    assert!(!manager.remove_subscription::<OrderCreated, H2>());
    assert!(!manager.remove_subscription::<OrderCreated, H1>());

    assert_eq!(manager.len(), 1);
    assert_eq!(manager.handler_count("OrderCancelled"), 1);
    assert!(removed.lock().unwrap().is_empty());
}

#[test]
fn test_event_key_is_deterministic() {
    let manager = InMemorySubscriptionManager::builder()
        .strip_suffix("IntegrationEvent")
        .build();

    let first = manager.get_event_key::<PaymentSucceededIntegrationEvent>();
    let second = manager.get_event_key::<PaymentSucceededIntegrationEvent>();
    assert_eq!(first, "PaymentSucceeded");
    assert_eq!(first, second);
}

// =============================================================================
// Dispatch Lookups
// =============================================================================

#[test]
fn test_dispatch_lookup_by_wire_name() {
    let mut manager = InMemorySubscriptionManager::new(|name: &str| {
        name.trim_end_matches("IntegrationEvent").to_string()
    });
    assert_ok!(manager.add_subscription::<PaymentSucceededIntegrationEvent, H1>());

    // a consumer receives "PaymentSucceeded" off the wire
    let wire_name = "PaymentSucceeded";
    assert!(manager.has_subscriptions_for_event_key(wire_name));
    let event_type = assert_ok!(manager.get_event_type_by_key(wire_name));
    assert_eq!(
        event_type,
        Some(EventTypeDescriptor::of::<PaymentSucceededIntegrationEvent>())
    );
    let event_type = assert_ok!(
        manager.get_event_type_by_name(&format!("{}IntegrationEvent", wire_name))
    );
    assert_eq!(event_type.map(|t| t.name()), Some("PaymentSucceededIntegrationEvent"));
}

#[test]
fn test_unhandled_lookup_fails_with_key_not_found() {
    let manager = InMemorySubscriptionManager::default();
    let err = assert_err!(manager.get_handlers_for_event::<OrderCreated>());
    assert_eq!(err, SubscriptionError::KeyNotFound("OrderCreated".to_string()));
}

// =============================================================================
// Bulk Reset
// =============================================================================

#[test]
fn test_clear_three_events() {
    let mut manager = InMemorySubscriptionManager::default();
    let removed = collect_removals(&manager);

    assert_ok!(manager.add_subscription::<OrderCreated, H1>());
    assert_ok!(manager.add_subscription::<OrderCancelled, H1>());
    assert_ok!(manager.add_subscription::<PaymentSucceededIntegrationEvent, H1>());
    assert_eq!(manager.len(), 3);

    manager.clear();

    assert!(manager.is_empty());
    assert!(removed.lock().unwrap().is_empty());
    for name in ["OrderCreated", "OrderCancelled", "PaymentSucceededIntegrationEvent"] {
        assert_eq!(manager.get_event_type_by_name(name), Ok(None));
    }
}

// =============================================================================
// Shared Registry
// =============================================================================

#[tokio::test]
async fn test_shared_registry_broadcasts_removals() {
    let manager = SharedSubscriptionManager::with_config(SubscriptionConfig::default());
    let mut rx = manager.subscribe_event_removed();

    let subscriber = manager.clone();
    tokio::spawn(async move {
        subscriber.add_subscription::<OrderCreated, H1>().unwrap();
        subscriber.add_subscription::<OrderCreated, H2>().unwrap();
    })
    .await
    .unwrap();

    assert_eq!(manager.handler_count("OrderCreated"), 2);

    assert!(manager.remove_subscription::<OrderCreated, H1>());
    assert!(manager.remove_subscription::<OrderCreated, H2>());

    assert_eq!(rx.recv().await.unwrap(), "OrderCreated");
    assert!(rx.try_recv().is_err());
    assert!(manager.is_empty());
}
