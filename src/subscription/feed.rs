//! # Feed construction.
//!
//! A feed is one bounded hand-off between a producer ([`Subscriber`]) and its
//! consumer ([`Subscription`]), both sharing one [`Lifecycle`].
//!
//! ```text
//! Subscriber ──notify──► [mpsc, feed_capacity] ──recv──► Subscription
//!      └──────────────── Lifecycle (gate, token, hooks) ─────┘
//! ```

use tokio::sync::mpsc;

use crate::config::Config;
use crate::notification::Value;
use crate::subscription::lifecycle::Lifecycle;
use crate::subscription::{Subscriber, Subscription};

/// What a feed does with an `Error` notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorMode {
    /// Deliver the error and keep the feed open for the trailing `Complete`.
    Forward,
    /// Deliver the error, then synthesize `Complete` right away.
    Mangle,
}

/// Creates a connected producer/consumer pair.
pub(crate) fn channel<T: Value>(cfg: &Config, errors: ErrorMode) -> (Subscriber<T>, Subscription<T>) {
    let (tx, rx) = mpsc::channel(cfg.feed_capacity_clamped());
    let lifecycle = Lifecycle::new();
    let subscriber = Subscriber::new(tx, lifecycle.clone(), errors);
    let subscription = Subscription::new(rx, lifecycle);
    (subscriber, subscription)
}
