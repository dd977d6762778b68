//! Broadcaster policies.
//!
//! ## Contents
//! - [`Teardown`] what a broadcaster does with its shared upstream once nobody listens
//!
//! ## Quick wiring
//! ```text
//! Config { feed_capacity, teardown: Teardown }
//!      └─► Observable::publish (broadcaster) uses:
//!           - teardown to decide whether the last leaving target disconnects upstream
//! ```
//!
//! ## Defaults
//! - `Teardown::KeepAlive`: upstream lives as long as the published observable.

mod teardown;

pub use teardown::Teardown;
