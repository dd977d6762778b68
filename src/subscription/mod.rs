//! # Subscriptions: the two halves of a feed plus their shared lifecycle.
//!
//! - [`Subscriber`] producer side: `notify`, `next`, `error`, `complete`
//! - [`Subscription`] consumer side: `recv`, `unsubscribe`, stream adapters
//! - [`SubscriptionRef`] clonable control handle
//! - [`CompositeSubscription`] one handle owning many
//!
//! ## Guarantees
//! - `is_subscribed` flips from `true` to `false` exactly once.
//! - Completion hooks run exactly once, in registration order; a hook added
//!   after termination runs immediately.
//! - At most one `Complete` reaches the consumer, and nothing follows it.
//! - Unsubscribing unblocks a producer parked on a full feed.

mod composite;
pub(crate) mod feed;
mod lifecycle;
mod subscriber;
mod subscription;

pub use composite::{Cancellable, CompositeSubscription};
pub use lifecycle::SubscriptionRef;
pub use subscriber::Subscriber;
pub use subscription::Subscription;
