//! # Notification data model.
//!
//! [`Notification`] is a closed enum: every consumer site matches it
//! exhaustively, so adding a variant is a compile error until all of them are
//! updated.
//!
//! ## Example
//! ```rust
//! use flowcast::{Notification, NotificationKind, StreamError};
//!
//! let n: Notification<u32> = Notification::Next(7);
//! assert_eq!(n.kind(), NotificationKind::Next);
//! assert_eq!(n.map(|v| v * 2), Notification::Next(14));
//!
//! let e: Notification<u32> = Notification::Error(StreamError::fail("boom"));
//! assert!(!e.is_complete());
//! assert_eq!(e.kind().as_label(), "error");
//! ```

use crate::error::StreamError;

/// Bound shared by every payload type carried through a stream.
///
/// Payloads are cloned once per broadcaster target and moved across tasks.
pub trait Value: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Value for T {}

/// One event of a stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification<T> {
    /// Synthetic marker: delivery has begun. Carries no payload.
    Start,
    /// A value.
    Next(T),
    /// Producer failure. Always followed by exactly one [`Notification::Complete`].
    Error(StreamError),
    /// Terminal marker. Exactly one per subscription, always last.
    Complete,
}

/// Classification of notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// See [`Notification::Start`].
    Start,
    /// See [`Notification::Next`].
    Next,
    /// See [`Notification::Error`].
    Error,
    /// See [`Notification::Complete`].
    Complete,
}

impl NotificationKind {
    /// Returns a short stable label for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            NotificationKind::Start => "start",
            NotificationKind::Next => "next",
            NotificationKind::Error => "error",
            NotificationKind::Complete => "complete",
        }
    }
}

impl<T> Notification<T> {
    /// Returns the kind of this notification.
    #[inline]
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::Start => NotificationKind::Start,
            Notification::Next(_) => NotificationKind::Next,
            Notification::Error(_) => NotificationKind::Error,
            Notification::Complete => NotificationKind::Complete,
        }
    }

    /// True for [`Notification::Complete`].
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, Notification::Complete)
    }

    /// True for [`Notification::Next`].
    #[inline]
    pub fn is_next(&self) -> bool {
        matches!(self, Notification::Next(_))
    }

    /// True for notifications that close the input of a stream (`Error`, `Complete`).
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Notification::Error(_) | Notification::Complete)
    }

    /// Returns the payload of a `Next`, consuming the notification.
    #[inline]
    pub fn into_value(self) -> Option<T> {
        match self {
            Notification::Next(v) => Some(v),
            Notification::Start | Notification::Error(_) | Notification::Complete => None,
        }
    }

    /// Returns the payload of a `Next` by reference.
    #[inline]
    pub fn value(&self) -> Option<&T> {
        match self {
            Notification::Next(v) => Some(v),
            Notification::Start | Notification::Error(_) | Notification::Complete => None,
        }
    }

    /// Returns the cause of an `Error`.
    #[inline]
    pub fn error(&self) -> Option<&StreamError> {
        match self {
            Notification::Error(e) => Some(e),
            Notification::Start | Notification::Next(_) | Notification::Complete => None,
        }
    }

    /// Transforms the payload of a `Next`; other kinds pass through unchanged.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Notification<U> {
        match self {
            Notification::Start => Notification::Start,
            Notification::Next(v) => Notification::Next(f(v)),
            Notification::Error(e) => Notification::Error(e),
            Notification::Complete => Notification::Complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        let all: [Notification<()>; 4] = [
            Notification::Start,
            Notification::Next(()),
            Notification::Error(StreamError::fail("x")),
            Notification::Complete,
        ];
        let labels: Vec<&str> = all.iter().map(|n| n.kind().as_label()).collect();
        assert_eq!(labels, vec!["start", "next", "error", "complete"]);
    }

    #[test]
    fn test_terminal_classification() {
        assert!(!Notification::<u8>::Start.is_terminal());
        assert!(!Notification::Next(1u8).is_terminal());
        assert!(Notification::<u8>::Error(StreamError::fail("x")).is_terminal());
        assert!(Notification::<u8>::Complete.is_terminal());
    }

    #[test]
    fn test_map_keeps_non_values() {
        let e: Notification<u8> = Notification::Error(StreamError::fail("x"));
        assert_eq!(e.map(|v| v as u32), Notification::Error(StreamError::fail("x")));
        assert_eq!(Notification::<u8>::Start.map(u32::from), Notification::Start);
        assert_eq!(Notification::Next(3u8).into_value(), Some(3));
    }
}
