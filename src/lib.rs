// Armature EventBus - building blocks for publish/subscribe event buses
//
// This library provides the subscription bookkeeping that sits beneath a
// broker transport: which handler types are registered for which events.

// Re-export the subscription registry
pub use armature_subscriptions::*;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        EventHandlerError,
        EventKey,
        EventTypeDescriptor,
        HandlerTypeDescriptor,
        InMemorySubscriptionManager,
        IntegrationEvent,
        IntegrationEventHandler,
        NameCollisionPolicy,
        SharedSubscriptionManager,
        SubscriptionConfig,
        SubscriptionError,
        SubscriptionInfo,
    };
}
