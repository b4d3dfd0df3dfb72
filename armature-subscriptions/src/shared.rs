//! Thread-safe subscription manager

use crate::config::SubscriptionConfig;
use crate::descriptor::{
    EventTypeDescriptor, HandlerTypeDescriptor, IntegrationEvent, IntegrationEventHandler,
};
use crate::error::Result;
use crate::manager::{EventKey, InMemorySubscriptionManager, Removal};
use crate::naming::EventNameMapper;
use crate::notifier::ListenerId;
use crate::subscription::SubscriptionInfo;
use parking_lot::{ReentrantMutex, RwLock};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Subscription manager shared between threads
///
/// Lookups run concurrently under a read lock; add, remove and clear are
/// exclusive. Event removed listeners run after the write lock is released,
/// so they may call back into the manager, but other threads cannot mutate
/// it until delivery has finished.
#[derive(Debug, Clone)]
pub struct SharedSubscriptionManager {
    inner: Arc<RwLock<InMemorySubscriptionManager>>,

    /// Serializes mutations with removal delivery. Reentrant so a listener
    /// may subscribe or unsubscribe from its own thread.
    mutation: Arc<ReentrantMutex<()>>,
}

impl SharedSubscriptionManager {
    /// Create a shared manager with the given naming function
    pub fn new(name_mapper: impl Into<EventNameMapper>) -> Self {
        Self::from_manager(InMemorySubscriptionManager::new(name_mapper))
    }

    /// Create a shared manager whose naming follows `config.event_name`
    pub fn with_config(config: SubscriptionConfig) -> Self {
        Self::from_manager(InMemorySubscriptionManager::with_config(config))
    }

    /// Share an existing manager
    pub fn from_manager(manager: InMemorySubscriptionManager) -> Self {
        Self {
            inner: Arc::new(RwLock::new(manager)),
            mutation: Arc::new(ReentrantMutex::new(())),
        }
    }

    /// Event key for event type `E`
    pub fn get_event_key<E: IntegrationEvent>(&self) -> EventKey {
        self.inner.read().get_event_key::<E>()
    }

    /// Event key for an event type
    pub fn event_key(&self, event_type: &EventTypeDescriptor) -> EventKey {
        self.inner.read().event_key(event_type)
    }

    /// Register handler `H` for event `E`
    pub fn add_subscription<E, H>(&self) -> Result<()>
    where
        E: IntegrationEvent,
        H: IntegrationEventHandler<E>,
    {
        let _mutation = self.mutation.lock();
        self.inner.write().add_subscription::<E, H>()
    }

    /// Register a handler type for an event type
    pub fn add_subscription_for(
        &self,
        event_type: EventTypeDescriptor,
        handler_type: HandlerTypeDescriptor,
    ) -> Result<()> {
        let _mutation = self.mutation.lock();
        self.inner.write().add_subscription_for(event_type, handler_type)
    }

    /// Unregister handler `H` from event `E`
    pub fn remove_subscription<E, H>(&self) -> bool
    where
        E: IntegrationEvent,
        H: IntegrationEventHandler<E>,
    {
        self.remove_subscription_for(
            EventTypeDescriptor::of::<E>(),
            HandlerTypeDescriptor::of::<H>(),
        )
    }

    /// Unregister a handler type from an event type
    pub fn remove_subscription_for(
        &self,
        event_type: EventTypeDescriptor,
        handler_type: HandlerTypeDescriptor,
    ) -> bool {
        // Held through delivery so the key cannot be re-subscribed meanwhile
        let _mutation = self.mutation.lock();
        let (removal, notifier) = {
            let mut inner = self.inner.write();
            let removal = inner.remove_handler(&event_type, handler_type);
            (removal, inner.notifier().clone())
        };

        match removal {
            Removal::Missing => false,
            Removal::Removed => true,
            Removal::EventRemoved(key) => {
                notifier.notify(&key);
                true
            }
        }
    }

    /// Check if event `E` has any handlers
    pub fn has_subscriptions_for_event<E: IntegrationEvent>(&self) -> bool {
        self.inner.read().has_subscriptions_for_event::<E>()
    }

    /// Check if an event key has any handlers
    pub fn has_subscriptions_for_event_key(&self, event_key: &str) -> bool {
        self.inner.read().has_subscriptions_for_event_key(event_key)
    }

    /// Snapshot of the handlers for event `E`
    pub fn get_handlers_for_event<E: IntegrationEvent>(&self) -> Result<Vec<SubscriptionInfo>> {
        self.inner
            .read()
            .get_handlers_for_event::<E>()
            .map(<[SubscriptionInfo]>::to_vec)
    }

    /// Snapshot of the handlers for an event key
    pub fn get_handlers_for_event_key(&self, event_key: &str) -> Result<Vec<SubscriptionInfo>> {
        self.inner
            .read()
            .get_handlers_for_event_key(event_key)
            .map(<[SubscriptionInfo]>::to_vec)
    }

    /// Tracked event type whose intrinsic name is `name`
    pub fn get_event_type_by_name(&self, name: &str) -> Result<Option<EventTypeDescriptor>> {
        self.inner.read().get_event_type_by_name(name)
    }

    /// Tracked event type whose event key is `event_key`
    pub fn get_event_type_by_key(&self, event_key: &str) -> Result<Option<EventTypeDescriptor>> {
        self.inner.read().get_event_type_by_key(event_key)
    }

    /// Remove every subscription without notifying
    pub fn clear(&self) {
        let _mutation = self.mutation.lock();
        self.inner.write().clear();
    }

    /// Check if no event key has handlers
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Number of event keys with handlers
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Number of handlers for an event key
    pub fn handler_count(&self, event_key: &str) -> usize {
        self.inner.read().handler_count(event_key)
    }

    /// Snapshot of the event keys with handlers
    pub fn event_keys(&self) -> Vec<EventKey> {
        self.inner.read().event_keys().map(str::to_string).collect()
    }

    /// Snapshot of the tracked event types
    pub fn event_types(&self) -> Vec<EventTypeDescriptor> {
        self.inner.read().event_types()
    }

    /// Attach an event removed listener
    pub fn on_event_removed<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.inner.read().on_event_removed(listener)
    }

    /// Detach an event removed listener
    pub fn remove_event_removed_listener(&self, id: ListenerId) -> bool {
        self.inner.read().remove_event_removed_listener(id)
    }

    /// Receive event removed notifications over a broadcast channel
    pub fn subscribe_event_removed(&self) -> broadcast::Receiver<EventKey> {
        self.inner.read().subscribe_event_removed()
    }
}

impl Default for SharedSubscriptionManager {
    fn default() -> Self {
        Self::from_manager(InMemorySubscriptionManager::default())
    }
}
