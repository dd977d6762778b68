//! Error types used by flowcast streams and subjects.
//!
//! This module defines two error enums:
//!
//! - [`StreamError`] — the cause carried by [`Notification::Error`](crate::Notification::Error).
//!   Errors are data: they travel through the feed like values and force termination.
//! - [`SubjectError`] — returned by [`Subject`](crate::Subject) push methods.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// # Error cause carried through a stream.
///
/// Cheap to clone (`Arc`-backed) so a broadcaster can hand the same cause to
/// every target.
#[non_exhaustive]
#[derive(Error, Clone)]
pub enum StreamError {
    /// Producer reported a failure with a message.
    #[error("stream failed: {error}")]
    Failed {
        /// The failure message.
        error: Arc<str>,
    },

    /// Producer forwarded an error raised by some other component.
    #[error("upstream error: {0}")]
    Upstream(Arc<dyn std::error::Error + Send + Sync + 'static>),
}

impl StreamError {
    /// Creates a [`StreamError::Failed`] from a message.
    ///
    /// # Example
    /// ```
    /// use flowcast::StreamError;
    ///
    /// let err = StreamError::fail("boom");
    /// assert_eq!(err.to_string(), "stream failed: boom");
    /// ```
    pub fn fail(error: impl Into<Arc<str>>) -> Self {
        StreamError::Failed {
            error: error.into(),
        }
    }

    /// Wraps any error into [`StreamError::Upstream`].
    pub fn upstream<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StreamError::Upstream(Arc::new(error))
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use flowcast::StreamError;
    ///
    /// assert_eq!(StreamError::fail("x").as_label(), "stream_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamError::Failed { .. } => "stream_failed",
            StreamError::Upstream(_) => "stream_upstream",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            StreamError::Failed { error } => format!("failed: {error}"),
            StreamError::Upstream(source) => format!("upstream: {source}"),
        }
    }
}

impl fmt::Debug for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Failed { error } => f.debug_struct("Failed").field("error", error).finish(),
            StreamError::Upstream(source) => f.debug_tuple("Upstream").field(source).finish(),
        }
    }
}

/// Two causes are equal when they are the same variant with the same message.
/// `Upstream` causes compare by identity first, then by rendered message.
impl PartialEq for StreamError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StreamError::Failed { error: a }, StreamError::Failed { error: b }) => a == b,
            (StreamError::Upstream(a), StreamError::Upstream(b)) => {
                Arc::ptr_eq(a, b) || a.to_string() == b.to_string()
            }
            _ => false,
        }
    }
}

/// # Errors produced by subject push methods.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectError {
    /// The subject input was already closed by `error` or `complete`.
    #[error("subject input closed")]
    Closed,
}

impl SubjectError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use flowcast::SubjectError;
    ///
    /// assert_eq!(SubjectError::Closed.as_label(), "subject_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SubjectError::Closed => "subject_closed",
        }
    }
}
