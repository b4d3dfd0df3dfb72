//! Event and handler type descriptors

use async_trait::async_trait;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Integration event trait
///
/// Marks a payload type that can be routed through an event bus. The
/// registry only ever looks at the type, never at an instance.
pub trait IntegrationEvent: Send + Sync + 'static {
    /// Intrinsic name of the event type
    ///
    /// Defaults to the unqualified Rust type name. Override it to pin the
    /// name independently of the Rust type.
    fn type_name() -> &'static str
    where
        Self: Sized,
    {
        short_type_name::<Self>()
    }
}

/// Integration event handler trait
#[async_trait]
pub trait IntegrationEventHandler<E: IntegrationEvent>: Send + Sync + 'static {
    /// Handle the event
    async fn handle(&self, event: &E) -> Result<(), EventHandlerError>;
}

/// Event handler error
#[derive(Debug, thiserror::Error)]
pub enum EventHandlerError {
    #[error("Handler failed: {0}")]
    HandlerFailed(String),

    #[error("Event processing error: {0}")]
    ProcessingError(String),
}

/// Unqualified name of a type, without module path or generic arguments.
///
/// `app::events::OrderCreated` becomes `OrderCreated`. Generic arguments are
/// dropped, so `Envelope<A>` and `Envelope<B>` both become `Envelope` and map
/// to the same event key. Tuple, array, slice and reference types come out
/// truncated and are not usable as event names. Override
/// [`IntegrationEvent::type_name`] for generic event types.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = match full.find('<') {
        Some(idx) => &full[..idx],
        None => full,
    };
    base.rsplit("::").next().unwrap_or(base)
}

/// Identifies a concrete event payload type
///
/// Equality and hashing use the `TypeId` only.
#[derive(Debug, Clone, Copy)]
pub struct EventTypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl EventTypeDescriptor {
    /// Descriptor for event type `E`
    pub fn of<E: IntegrationEvent>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: E::type_name(),
        }
    }

    /// Intrinsic name of the event type
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Runtime type identifier
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for EventTypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventTypeDescriptor {}

impl Hash for EventTypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for EventTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identifies a handler implementation type
#[derive(Debug, Clone, Copy)]
pub struct HandlerTypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl HandlerTypeDescriptor {
    /// Descriptor for handler type `H`
    pub fn of<H: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<H>(),
            name: short_type_name::<H>(),
        }
    }

    /// Unqualified name of the handler type
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Runtime type identifier
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for HandlerTypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for HandlerTypeDescriptor {}

impl Hash for HandlerTypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for HandlerTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OrderCreated;
    impl IntegrationEvent for OrderCreated {}

    struct LegacyEvent;
    impl IntegrationEvent for LegacyEvent {
        fn type_name() -> &'static str {
            "OrderShipped"
        }
    }

    #[allow(dead_code)]
    struct Envelope<T>(T);

    struct AuditHandler;

    #[async_trait]
    impl IntegrationEventHandler<OrderCreated> for AuditHandler {
        async fn handle(&self, _event: &OrderCreated) -> Result<(), EventHandlerError> {
            Ok(())
        }
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<OrderCreated>(), "OrderCreated");
        assert_eq!(short_type_name::<Envelope<OrderCreated>>(), "Envelope");
        assert_eq!(short_type_name::<u32>(), "u32");
    }

    #[test]
    fn test_generic_instantiations_share_a_name() {
        assert_eq!(
            short_type_name::<Envelope<OrderCreated>>(),
            short_type_name::<Envelope<LegacyEvent>>()
        );
        assert_ne!(
            TypeId::of::<Envelope<OrderCreated>>(),
            TypeId::of::<Envelope<LegacyEvent>>()
        );
    }

    #[test]
    fn test_event_descriptor() {
        let a = EventTypeDescriptor::of::<OrderCreated>();
        let b = EventTypeDescriptor::of::<OrderCreated>();
        let legacy = EventTypeDescriptor::of::<LegacyEvent>();

        assert_eq!(a, b);
        assert_ne!(a, legacy);
        assert_eq!(a.name(), "OrderCreated");
        assert_eq!(legacy.name(), "OrderShipped");
        assert_eq!(a.to_string(), "OrderCreated");
    }

    #[test]
    fn test_handler_descriptor() {
        let handler = HandlerTypeDescriptor::of::<AuditHandler>();
        assert_eq!(handler.name(), "AuditHandler");
        assert_eq!(handler.type_id(), TypeId::of::<AuditHandler>());
        assert_ne!(handler, HandlerTypeDescriptor::of::<OrderCreated>());
    }

    #[tokio::test]
    async fn test_handler_trait_is_callable() {
        let handler = AuditHandler;
        assert!(handler.handle(&OrderCreated).await.is_ok());
    }
}
