//! Subscription records

use crate::descriptor::HandlerTypeDescriptor;
use crate::error::{Result, SubscriptionError};

/// Association between an event key and one handler type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionInfo {
    handler_type: HandlerTypeDescriptor,
}

impl SubscriptionInfo {
    /// Create a subscription, failing when no handler type is given
    pub fn new(handler_type: Option<HandlerTypeDescriptor>) -> Result<Self> {
        handler_type
            .map(Self::typed)
            .ok_or(SubscriptionError::InvalidHandler)
    }

    /// Create a subscription for a known handler type
    pub fn typed(handler_type: HandlerTypeDescriptor) -> Self {
        Self { handler_type }
    }

    /// Handler type this subscription dispatches to
    pub fn handler_type(&self) -> HandlerTypeDescriptor {
        self.handler_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PaymentHandler;

    #[test]
    fn test_new_requires_handler() {
        let err = SubscriptionInfo::new(None).unwrap_err();
        assert_eq!(err, SubscriptionError::InvalidHandler);

        let handler = HandlerTypeDescriptor::of::<PaymentHandler>();
        let info = SubscriptionInfo::new(Some(handler)).unwrap();
        assert_eq!(info.handler_type(), handler);
        assert_eq!(info, SubscriptionInfo::typed(handler));
    }
}
