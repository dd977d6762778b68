//! # Logging tap for debugging and demos.
//!
//! [`LogWriter`] forwards every notification unchanged and records it through
//! `tracing` at `INFO` (errors at `WARN`).
//!
//! ## Output format (with `tracing_subscriber::fmt`)
//! ```text
//! INFO flowcast::operators::log: notification label="prices" kind="start"
//! INFO flowcast::operators::log: notification label="prices" kind="next" value=17
//! WARN flowcast::operators::log: notification label="prices" kind="error" error="failed: boom"
//! INFO flowcast::operators::log: notification label="prices" kind="complete"
//! ```
//!
//! ## Example
//! ```no_run
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use flowcast::Observable;
//!
//! let obs = Observable::from_iter(vec![1u32, 2]).log("numbers");
//! let _ = obs.subscribe();
//! # }
//! ```

use std::borrow::Cow;
use std::fmt;

use async_trait::async_trait;

use crate::notification::{Notification, Value};
use crate::observable::Operator;
use crate::subscription::Subscriber;

/// Pass-through operator logging each notification.
///
/// Enabled via the `logging` feature. Not intended for production use: write
/// a custom [`Operator`] for structured metrics.
#[derive(Debug, Clone)]
pub struct LogWriter {
    label: Cow<'static, str>,
}

impl LogWriter {
    /// Creates a tap tagging its records with `label`.
    pub fn new(label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Returns the label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

#[async_trait]
impl<T: Value + fmt::Debug> Operator<T, T> for LogWriter {
    async fn notify(&self, downstream: &Subscriber<T>, notification: Notification<T>) {
        let label = self.label.as_ref();
        let kind = notification.kind().as_label();
        match &notification {
            Notification::Next(value) => {
                tracing::info!(label, kind, value = ?value, "notification");
            }
            Notification::Error(error) => {
                tracing::warn!(label, kind, error = %error.as_message(), "notification");
            }
            Notification::Start | Notification::Complete => {
                tracing::info!(label, kind, "notification");
            }
        }
        downstream.notify(notification).await;
    }
}
