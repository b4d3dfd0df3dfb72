//! Subscription registry for Armature event buses
//!
//! This crate tracks which handler types are registered for which events.
//! It is the bookkeeping layer beneath a publish/subscribe bus: it never
//! sends, receives or dispatches a message.
//!
//! ## Features
//!
//! - **Event keys** - Canonical event names derived from type names
//! - **Unique subscriptions** - At most one registration per handler and event
//! - **Dispatch lookups** - Handler types and event types by wire name
//! - **Removal notifications** - Know when an event name becomes unhandled
//! - **Thread-safe wrapper** - Share one registry between tasks
//!
//! ## Quick Start
//!
//! ```rust
//! use armature_subscriptions::*;
//! use async_trait::async_trait;
//!
//! struct OrderCreatedIntegrationEvent;
//! impl IntegrationEvent for OrderCreatedIntegrationEvent {}
//!
//! struct EmailHandler;
//!
//! #[async_trait]
//! impl IntegrationEventHandler<OrderCreatedIntegrationEvent> for EmailHandler {
//!     async fn handle(
//!         &self,
//!         _event: &OrderCreatedIntegrationEvent,
//!     ) -> std::result::Result<(), EventHandlerError> {
//!         Ok(())
//!     }
//! }
//!
//! let mut manager = InMemorySubscriptionManager::builder()
//!     .strip_suffix("IntegrationEvent")
//!     .build();
//!
//! manager.on_event_removed(|event_key| {
//!     println!("No local handlers left for {}", event_key);
//! });
//!
//! manager
//!     .add_subscription::<OrderCreatedIntegrationEvent, EmailHandler>()
//!     .unwrap();
//! assert!(manager.has_subscriptions_for_event_key("OrderCreated"));
//!
//! manager.remove_subscription::<OrderCreatedIntegrationEvent, EmailHandler>();
//! assert!(manager.is_empty());
//! ```
//!
//! ## Duplicate Registrations
//!
//! ```rust,ignore
//! manager.add_subscription::<OrderCreated, EmailHandler>()?;
//!
//! match manager.add_subscription::<OrderCreated, EmailHandler>() {
//!     Err(SubscriptionError::DuplicateRegistration { handler, event_key }) => {
//!         eprintln!("{} is already subscribed to {}", handler, event_key);
//!     }
//!     other => other?,
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! let manager = InMemorySubscriptionManager::builder()
//!     .strip_suffix("IntegrationEvent")           // OrderCreatedIntegrationEvent -> OrderCreated
//!     .name_collision(NameCollisionPolicy::FirstMatch)
//!     .enable_logging(false)
//!     .build();
//!
//! // Or from ARMATURE_SUBSCRIPTIONS_* environment variables
//! let manager = InMemorySubscriptionManager::with_config(SubscriptionConfig::from_env());
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod manager;
pub mod naming;
pub mod notifier;
pub mod shared;
pub mod subscription;

pub use config::{EventNameConfig, NameCollisionPolicy, SubscriptionConfig};
pub use descriptor::{
    EventHandlerError, EventTypeDescriptor, HandlerTypeDescriptor, IntegrationEvent,
    IntegrationEventHandler, short_type_name,
};
pub use error::{Result, SubscriptionError};
pub use manager::{EventKey, InMemorySubscriptionManager, SubscriptionManagerBuilder};
pub use naming::EventNameMapper;
pub use notifier::{EventRemovedListener, EventRemovedNotifier, ListenerId};
pub use shared::SharedSubscriptionManager;
pub use subscription::SubscriptionInfo;
