//! Error types for subscription registry operations

use thiserror::Error;

/// Errors raised by the subscription registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The handler type is already registered for the event key
    #[error("Handler type {handler} already registered for '{event_key}'")]
    DuplicateRegistration {
        handler: &'static str,
        event_key: String,
    },

    /// No handlers are registered for the event key
    #[error("No subscriptions registered for event: {0}")]
    KeyNotFound(String),

    /// A subscription was built without a handler type
    #[error("Subscription requires a handler type")]
    InvalidHandler,

    /// More than one tracked event type answers to the same name
    #[error("Event name '{name}' matches {candidates} registered event types")]
    AmbiguousEventName { name: String, candidates: usize },
}

impl SubscriptionError {
    /// Check if this error is a duplicate registration
    pub fn is_duplicate(&self) -> bool {
        matches!(self, SubscriptionError::DuplicateRegistration { .. })
    }

    /// Check if this error is a missing event key
    pub fn is_not_found(&self) -> bool {
        matches!(self, SubscriptionError::KeyNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, SubscriptionError>;
