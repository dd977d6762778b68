//! Notifications: the values that travel through every feed.
//!
//! ## Contents
//! - [`Notification`] the tagged event (`Start` / `Next` / `Error` / `Complete`)
//! - [`NotificationKind`] fieldless classification with stable labels
//! - [`Value`] blanket bound for payload types
//!
//! ## Protocol
//! ```text
//! per subscription:  Start?  Next*  ( Error Complete | Complete )
//!                                                       └─ nothing after this
//! ```

mod notification;

pub use notification::{Notification, NotificationKind, Value};
