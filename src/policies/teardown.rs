//! # Upstream teardown policy for broadcasters.
//!
//! [`Teardown`] determines what happens to the shared upstream subscription of a
//! published observable when its last target unsubscribes.
//!
//! - [`Teardown::KeepAlive`] upstream stays connected for the lifetime of the
//!   published observable (default).
//! - [`Teardown::WhenEmpty`] upstream is disconnected as soon as the target set
//!   becomes empty; the next subscriber connects a fresh upstream.
//!
//! ## Choosing the right policy
//!
//! **Hot sources** (subjects, sensors, tickers shared by transient listeners):
//! ```text
//! Teardown::KeepAlive   → values keep flowing (and are dropped) while nobody listens
//! ```
//!
//! **Expensive cold sources** (connections opened per subscription):
//! ```text
//! Teardown::WhenEmpty   → last listener leaves → upstream closed
//!                         next listener arrives → upstream reopened from scratch
//! ```
//!
//! In both cases dropping every handle to the published observable disconnects
//! upstream and completes the targets still attached.

/// Policy controlling the shared upstream of a broadcaster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Teardown {
    /// Keep upstream connected until it completes or the broadcaster is dropped (default).
    #[default]
    KeepAlive,
    /// Disconnect upstream when the last target leaves; reconnect on the next subscribe.
    WhenEmpty,
}
