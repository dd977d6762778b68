//! # Stream configuration.
//!
//! Provides [`Config`] centralized settings carried by every observable node.
//!
//! Config is used in three ways:
//! 1. **Sources**: `Observable::create_with(config, producer)`
//! 2. **Derived nodes**: `lift`, `publish`, `merge` inherit the config of their source
//! 3. **Subjects**: `Subject::with_config(config)`
//!
//! ## Sentinel values
//! - `feed_capacity = 0` → treated as `1` (the smallest bounded hand-off Tokio provides)

use crate::policies::Teardown;

/// Configuration of an observable node.
///
/// ## Field semantics
/// - `feed_capacity`: slots buffered between a producer and its consumer (min 1; clamped)
/// - `teardown`: what a broadcaster does with its upstream when its target set empties
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Capacity of each subscription feed.
    ///
    /// - `1` = closest to a synchronous rendezvous (default)
    /// - `n > 1` = producer may run up to `n` notifications ahead of the consumer
    ///
    /// A broadcaster is throttled by its slowest target, so this is also how far
    /// fast targets can get ahead of slow ones.
    pub feed_capacity: usize,

    /// Broadcaster upstream policy. See [`Teardown`].
    pub teardown: Teardown,
}

impl Config {
    /// Returns the feed capacity clamped to a minimum of 1.
    #[inline]
    pub fn feed_capacity_clamped(&self) -> usize {
        self.feed_capacity.max(1)
    }

    /// Returns a new config with an updated feed capacity.
    #[must_use]
    pub fn with_feed_capacity(mut self, feed_capacity: usize) -> Self {
        self.feed_capacity = feed_capacity;
        self
    }

    /// Returns a new config with an updated teardown policy.
    #[must_use]
    pub fn with_teardown(mut self, teardown: Teardown) -> Self {
        self.teardown = teardown;
        self
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `feed_capacity = 1`
    /// - `teardown = Teardown::KeepAlive`
    fn default() -> Self {
        Self {
            feed_capacity: 1,
            teardown: Teardown::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cfg = Config::default().with_feed_capacity(0);
        assert_eq!(cfg.feed_capacity_clamped(), 1);
        assert_eq!(cfg.with_feed_capacity(8).feed_capacity_clamped(), 8);
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.feed_capacity, 1);
        assert_eq!(cfg.teardown, Teardown::KeepAlive);
    }
}
