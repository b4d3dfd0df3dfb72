//! Event name mapping

use crate::config::EventNameConfig;
use std::fmt;
use std::sync::Arc;

/// Pure function from an event type's intrinsic name to its event key
#[derive(Clone)]
pub struct EventNameMapper {
    map: Arc<dyn Fn(&str) -> String + Send + Sync>,
}

impl EventNameMapper {
    /// Wrap a naming function
    pub fn new<F>(map: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self { map: Arc::new(map) }
    }

    /// Use type names unchanged
    pub fn identity() -> Self {
        Self::new(str::to_string)
    }

    /// Map names through a prefix/suffix convention
    pub fn from_config(config: EventNameConfig) -> Self {
        Self::new(move |name| config.apply(name))
    }

    /// Map a type name to its event key
    pub fn map(&self, type_name: &str) -> String {
        (self.map)(type_name)
    }
}

impl Default for EventNameMapper {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for EventNameMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventNameMapper").finish_non_exhaustive()
    }
}

impl<F> From<F> for EventNameMapper
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    fn from(map: F) -> Self {
        Self::new(map)
    }
}
