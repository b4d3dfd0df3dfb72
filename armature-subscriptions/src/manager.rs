//! In-memory subscription manager

use crate::config::{NameCollisionPolicy, SubscriptionConfig};
use crate::descriptor::{
    EventTypeDescriptor, HandlerTypeDescriptor, IntegrationEvent, IntegrationEventHandler,
};
use crate::error::{Result, SubscriptionError};
use crate::naming::EventNameMapper;
use crate::notifier::{EventRemovedNotifier, ListenerId};
use crate::shared::SharedSubscriptionManager;
use crate::subscription::SubscriptionInfo;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Canonical event name produced by the naming function
pub type EventKey = String;

/// Outcome of detaching a handler from an event key
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Removal {
    /// No such subscription
    Missing,
    /// Subscription removed, the key still has handlers
    Removed,
    /// Last subscription removed, the key is gone
    EventRemoved(EventKey),
}

/// Registry of handler types per event key
///
/// Owned by a single bus. Mutations take `&mut self`; wrap it in a
/// [`SharedSubscriptionManager`] to share it across threads.
#[derive(Debug)]
pub struct InMemorySubscriptionManager {
    /// Handlers per event key, in registration order
    handlers: HashMap<EventKey, Vec<SubscriptionInfo>>,

    /// Event types that currently have at least one handler, with their keys
    event_types: Vec<(EventTypeDescriptor, EventKey)>,

    name_mapper: EventNameMapper,
    notifier: EventRemovedNotifier,
    config: SubscriptionConfig,
}

impl InMemorySubscriptionManager {
    /// Create a manager with the given naming function
    ///
    /// # Examples
    ///
    /// ```rust
    /// use armature_subscriptions::InMemorySubscriptionManager;
    ///
    /// let manager = InMemorySubscriptionManager::new(|name: &str| {
    ///     name.trim_end_matches("IntegrationEvent").to_string()
    /// });
    /// assert!(manager.is_empty());
    /// ```
    pub fn new(name_mapper: impl Into<EventNameMapper>) -> Self {
        Self::from_parts(SubscriptionConfig::default(), name_mapper.into())
    }

    /// Create a manager whose naming follows `config.event_name`
    pub fn with_config(config: SubscriptionConfig) -> Self {
        let name_mapper = EventNameMapper::from_config(config.event_name.clone());
        Self::from_parts(config, name_mapper)
    }

    /// Create a manager builder
    pub fn builder() -> SubscriptionManagerBuilder {
        SubscriptionManagerBuilder::new()
    }

    fn from_parts(config: SubscriptionConfig, name_mapper: EventNameMapper) -> Self {
        Self {
            handlers: HashMap::new(),
            event_types: Vec::new(),
            name_mapper,
            notifier: EventRemovedNotifier::new(config.removal_channel_capacity),
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &SubscriptionConfig {
        &self.config
    }

    /// Event key for an event type
    pub fn event_key(&self, event_type: &EventTypeDescriptor) -> EventKey {
        self.name_mapper.map(event_type.name())
    }

    /// Event key for event type `E`
    pub fn get_event_key<E: IntegrationEvent>(&self) -> EventKey {
        self.event_key(&EventTypeDescriptor::of::<E>())
    }

    /// Register handler `H` for event `E`
    ///
    /// Fails with [`SubscriptionError::DuplicateRegistration`] if `H` is
    /// already registered for the event key of `E`.
    pub fn add_subscription<E, H>(&mut self) -> Result<()>
    where
        E: IntegrationEvent,
        H: IntegrationEventHandler<E>,
    {
        self.add_subscription_for(EventTypeDescriptor::of::<E>(), HandlerTypeDescriptor::of::<H>())
    }

    /// Register a handler type for an event type
    pub fn add_subscription_for(
        &mut self,
        event_type: EventTypeDescriptor,
        handler_type: HandlerTypeDescriptor,
    ) -> Result<()> {
        let key = self.event_key(&event_type);
        self.add_handler(&key, handler_type)?;

        if !self.event_types.iter().any(|(t, _)| *t == event_type) {
            if self.config.enable_logging {
                if let Some(existing) = self.find_by_key(&key).next() {
                    warn!(
                        "Event types {} and {} share event key '{}'",
                        existing, event_type, key
                    );
                }
            }
            self.event_types.push((event_type, key));
        }

        Ok(())
    }

    fn add_handler(&mut self, key: &str, handler_type: HandlerTypeDescriptor) -> Result<()> {
        let handlers = self.handlers.entry(key.to_string()).or_default();

        if handlers.iter().any(|s| s.handler_type() == handler_type) {
            return Err(SubscriptionError::DuplicateRegistration {
                handler: handler_type.name(),
                event_key: key.to_string(),
            });
        }

        handlers.push(SubscriptionInfo::typed(handler_type));

        if self.config.enable_logging {
            debug!("Subscribed handler {} for event: {}", handler_type, key);
        }

        Ok(())
    }

    /// Unregister handler `H` from event `E`
    ///
    /// Removing a subscription that does not exist is a no-op. Returns
    /// whether a subscription was removed.
    pub fn remove_subscription<E, H>(&mut self) -> bool
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
        &mut self,
        event_type: EventTypeDescriptor,
        handler_type: HandlerTypeDescriptor,
    ) -> bool {
        match self.remove_handler(&event_type, handler_type) {
            Removal::Missing => false,
            Removal::Removed => true,
            Removal::EventRemoved(key) => {
                self.notifier.notify(&key);
                true
            }
        }
    }

    /// Detach a handler without notifying listeners
    pub(crate) fn remove_handler(
        &mut self,
        event_type: &EventTypeDescriptor,
        handler_type: HandlerTypeDescriptor,
    ) -> Removal {
        let key = self.event_key(event_type);

        let Some(handlers) = self.handlers.get_mut(&key) else {
            return Removal::Missing;
        };
        let Some(position) = handlers
            .iter()
            .position(|s| s.handler_type() == handler_type)
        else {
            return Removal::Missing;
        };

        handlers.remove(position);

        if self.config.enable_logging {
            debug!("Unsubscribed handler {} from event: {}", handler_type, key);
        }

        if !handlers.is_empty() {
            return Removal::Removed;
        }

        self.handlers.remove(&key);
        self.event_types.retain(|(_, event_key)| *event_key != key);

        if self.config.enable_logging {
            info!("No handlers left for event: {}", key);
        }

        Removal::EventRemoved(key)
    }

    /// Check if event `E` has any handlers
    pub fn has_subscriptions_for_event<E: IntegrationEvent>(&self) -> bool {
        self.has_subscriptions_for_event_key(&self.get_event_key::<E>())
    }

    /// Check if an event key has any handlers
    pub fn has_subscriptions_for_event_key(&self, event_key: &str) -> bool {
        self.handlers.contains_key(event_key)
    }

    /// Handlers for event `E`, in registration order
    pub fn get_handlers_for_event<E: IntegrationEvent>(&self) -> Result<&[SubscriptionInfo]> {
        let key = self.get_event_key::<E>();
        self.get_handlers_for_event_key(&key)
    }

    /// Handlers for an event key, in registration order
    ///
    /// Fails with [`SubscriptionError::KeyNotFound`] if the key has no handlers.
    pub fn get_handlers_for_event_key(&self, event_key: &str) -> Result<&[SubscriptionInfo]> {
        self.handlers
            .get(event_key)
            .map(Vec::as_slice)
            .ok_or_else(|| SubscriptionError::KeyNotFound(event_key.to_string()))
    }

    /// Tracked event type whose intrinsic name is `name`
    ///
    /// `Ok(None)` when nothing matches. Several matches are resolved by the
    /// configured [`NameCollisionPolicy`].
    pub fn get_event_type_by_name(&self, name: &str) -> Result<Option<EventTypeDescriptor>> {
        let matches = self
            .event_types
            .iter()
            .map(|(t, _)| t)
            .filter(|t| t.name() == name);
        self.resolve(name, matches)
    }

    /// Tracked event type whose event key is `event_key`
    pub fn get_event_type_by_key(&self, event_key: &str) -> Result<Option<EventTypeDescriptor>> {
        self.resolve(event_key, self.find_by_key(event_key))
    }

    fn find_by_key<'a>(
        &'a self,
        event_key: &'a str,
    ) -> impl Iterator<Item = &'a EventTypeDescriptor> + 'a {
        self.event_types
            .iter()
            .filter(move |(_, key)| key == event_key)
            .map(|(t, _)| t)
    }

    fn resolve<'a>(
        &self,
        name: &str,
        mut matches: impl Iterator<Item = &'a EventTypeDescriptor>,
    ) -> Result<Option<EventTypeDescriptor>> {
        let Some(first) = matches.next() else {
            return Ok(None);
        };

        let others = matches.count();
        if others == 0 {
            return Ok(Some(*first));
        }

        match self.config.name_collision {
            NameCollisionPolicy::Reject => Err(SubscriptionError::AmbiguousEventName {
                name: name.to_string(),
                candidates: others + 1,
            }),
            NameCollisionPolicy::FirstMatch => {
                if self.config.enable_logging {
                    warn!(
                        "Event name '{}' matches {} event types, using {}",
                        name,
                        others + 1,
                        first
                    );
                }
                Ok(Some(*first))
            }
        }
    }

    /// Remove every subscription and tracked event type
    ///
    /// No event removed notifications are emitted.
    pub fn clear(&mut self) {
        self.handlers.clear();
        self.event_types.clear();

        if self.config.enable_logging {
            info!("Cleared all subscriptions");
        }
    }

    /// Check if no event key has handlers
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Number of event keys with handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Number of handlers for an event key
    pub fn handler_count(&self, event_key: &str) -> usize {
        self.handlers.get(event_key).map(|h| h.len()).unwrap_or(0)
    }

    /// Event keys with handlers, in no particular order
    pub fn event_keys(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Event types with handlers, in registration order
    pub fn event_types(&self) -> Vec<EventTypeDescriptor> {
        self.event_types.iter().map(|(t, _)| *t).collect()
    }

    /// Attach an event removed listener
    pub fn on_event_removed<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = self.notifier.attach(listener);
        if self.config.enable_logging {
            debug!("Attached event removed listener {:?}", id);
        }
        id
    }

    /// Detach an event removed listener
    pub fn remove_event_removed_listener(&self, id: ListenerId) -> bool {
        let removed = self.notifier.detach(id);
        if removed && self.config.enable_logging {
            debug!("Detached event removed listener {:?}", id);
        }
        removed
    }

    /// Number of attached event removed listeners
    pub fn event_removed_listener_count(&self) -> usize {
        self.notifier.listener_count()
    }

    /// Receive event removed notifications over a broadcast channel
    pub fn subscribe_event_removed(&self) -> broadcast::Receiver<EventKey> {
        self.notifier.subscribe()
    }

    pub(crate) fn notifier(&self) -> &EventRemovedNotifier {
        &self.notifier
    }
}

impl Default for InMemorySubscriptionManager {
    fn default() -> Self {
        Self::with_config(SubscriptionConfig::default())
    }
}

/// Subscription manager builder
#[derive(Debug, Default)]
pub struct SubscriptionManagerBuilder {
    config: SubscriptionConfig,
    name_mapper: Option<EventNameMapper>,
}

impl SubscriptionManagerBuilder {
    /// Create new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: SubscriptionConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable/disable logging
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.config.enable_logging = enabled;
        self
    }

    /// Set the name collision policy
    pub fn name_collision(mut self, policy: NameCollisionPolicy) -> Self {
        self.config.name_collision = policy;
        self
    }

    /// Strip a prefix from event type names
    pub fn strip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.event_name.strip_prefix = Some(prefix.into());
        self
    }

    /// Strip a suffix from event type names
    pub fn strip_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.event_name.strip_suffix = Some(suffix.into());
        self
    }

    /// Set the removal broadcast capacity
    pub fn removal_channel_capacity(mut self, capacity: usize) -> Self {
        self.config.removal_channel_capacity = capacity;
        self
    }

    /// Use a custom naming function, overriding prefix/suffix stripping
    pub fn name_mapper(mut self, name_mapper: impl Into<EventNameMapper>) -> Self {
        self.name_mapper = Some(name_mapper.into());
        self
    }

    /// Build the manager
    pub fn build(self) -> InMemorySubscriptionManager {
        let name_mapper = self
            .name_mapper
            .unwrap_or_else(|| EventNameMapper::from_config(self.config.event_name.clone()));
        InMemorySubscriptionManager::from_parts(self.config, name_mapper)
    }

    /// Build a thread-safe manager
    pub fn build_shared(self) -> SharedSubscriptionManager {
        SharedSubscriptionManager::from_manager(self.build())
    }
}
