//! Subscription registry configuration
//!
//! # Environment Variables
//!
//! - `ARMATURE_SUBSCRIPTIONS_LOGGING=1|0` - Enable/disable registry logging
//! - `ARMATURE_SUBSCRIPTIONS_NAME_COLLISION=reject|first_match` - Name lookup policy
//! - `ARMATURE_SUBSCRIPTIONS_STRIP_PREFIX` - Prefix removed from event type names
//! - `ARMATURE_SUBSCRIPTIONS_STRIP_SUFFIX` - Suffix removed from event type names
//! - `ARMATURE_SUBSCRIPTIONS_CHANNEL_CAPACITY` - Removal broadcast capacity

use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// How name lookups resolve several event types sharing one name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCollisionPolicy {
    /// Report the ambiguity as an error
    #[default]
    Reject,
    /// Return the earliest registered match
    FirstMatch,
}

impl NameCollisionPolicy {
    /// Get policy from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "reject" | "error" => Some(NameCollisionPolicy::Reject),
            "first_match" | "first-match" | "first" => Some(NameCollisionPolicy::FirstMatch),
            _ => None,
        }
    }
}

/// Naming convention turning an event type name into an event key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventNameConfig {
    /// Prefix stripped from the type name
    #[serde(default)]
    pub strip_prefix: Option<String>,

    /// Suffix stripped from the type name
    #[serde(default)]
    pub strip_suffix: Option<String>,
}

impl EventNameConfig {
    /// Strip the prefix
    pub fn with_strip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.strip_prefix = Some(prefix.into());
        self
    }

    /// Strip the suffix
    pub fn with_strip_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.strip_suffix = Some(suffix.into());
        self
    }

    /// Apply the convention to a type name.
    ///
    /// A prefix or suffix is only removed when something remains afterwards.
    pub fn apply(&self, type_name: &str) -> String {
        let mut name = type_name;
        if let Some(prefix) = self.strip_prefix.as_deref().filter(|p| !p.is_empty()) {
            if let Some(rest) = name.strip_prefix(prefix).filter(|r| !r.is_empty()) {
                name = rest;
            }
        }
        if let Some(suffix) = self.strip_suffix.as_deref().filter(|s| !s.is_empty()) {
            if let Some(rest) = name.strip_suffix(suffix).filter(|r| !r.is_empty()) {
                name = rest;
            }
        }
        name.to_string()
    }
}

/// Subscription registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    /// Enable registry logging
    #[serde(default = "default_enable_logging")]
    pub enable_logging: bool,

    /// Name lookup collision policy
    #[serde(default)]
    pub name_collision: NameCollisionPolicy,

    /// Naming convention used when no explicit mapper is supplied
    #[serde(default)]
    pub event_name: EventNameConfig,

    /// Capacity of the removal broadcast channel
    #[serde(default = "default_channel_capacity")]
    pub removal_channel_capacity: usize,
}

fn default_enable_logging() -> bool {
    true
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            enable_logging: default_enable_logging(),
            name_collision: NameCollisionPolicy::default(),
            event_name: EventNameConfig::default(),
            removal_channel_capacity: default_channel_capacity(),
        }
    }
}

impl SubscriptionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup.
    ///
    /// Missing or unparseable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let enable_logging = lookup("ARMATURE_SUBSCRIPTIONS_LOGGING")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(defaults.enable_logging);

        let name_collision = lookup("ARMATURE_SUBSCRIPTIONS_NAME_COLLISION")
            .and_then(|s| NameCollisionPolicy::parse(&s))
            .unwrap_or(defaults.name_collision);

        let event_name = EventNameConfig {
            strip_prefix: lookup("ARMATURE_SUBSCRIPTIONS_STRIP_PREFIX").filter(|s| !s.is_empty()),
            strip_suffix: lookup("ARMATURE_SUBSCRIPTIONS_STRIP_SUFFIX").filter(|s| !s.is_empty()),
        };

        let removal_channel_capacity = lookup("ARMATURE_SUBSCRIPTIONS_CHANNEL_CAPACITY")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|c| *c > 0)
            .unwrap_or(defaults.removal_channel_capacity);

        Self {
            enable_logging,
            name_collision,
            event_name,
            removal_channel_capacity,
        }
    }
}
