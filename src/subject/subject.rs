//! # Subject: push-driven multicast stream.
//!
//! ```text
//! next/error/complete ──► mpsc (feed_capacity) ──► leaf source ──► Published (connected) ──► targets
//! ```
//!
//! - The broadcaster is connected at construction, so values pushed while
//!   nobody is subscribed are dropped.
//! - The first `error` or `complete` closes the input; later pushes return
//!   [`SubjectError::Closed`].
//! - A subscriber that arrives after the subject ended gets `Start` + `Complete`.
//! - Dropping the subject closes the input, which completes every subscriber.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::error::{StreamError, SubjectError};
use crate::notification::{Notification, Value};
use crate::observable::Observable;
use crate::policies::Teardown;
use crate::subscription::{Subscriber, Subscription};

/// Observer and observable at once.
///
/// # Example
/// ```rust
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), flowcast::SubjectError> {
/// use flowcast::{Notification, Subject};
///
/// let subject = Subject::new();
/// let mut sub = subject.subscribe();
/// assert_eq!(sub.recv().await, Some(Notification::Start));
///
/// let pusher = tokio::spawn(async move {
///     subject.next("hello").await?;
///     subject.complete().await
/// });
/// assert_eq!(sub.recv().await, Some(Notification::Next("hello")));
/// assert_eq!(sub.recv().await, Some(Notification::Complete));
/// pusher.await.expect("pusher panicked")?;
/// # Ok(())
/// # }
/// ```
pub struct Subject<T> {
    input: Mutex<Option<mpsc::Sender<Notification<T>>>>,
    output: Observable<T>,
}

impl<T: Value> Subject<T> {
    /// Creates a subject with default config.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a subject. `config.feed_capacity` sizes the input channel and
    /// every subscriber feed; the broadcaster always uses [`Teardown::KeepAlive`].
    pub fn with_config(config: Config) -> Self {
        let config = config.with_teardown(Teardown::KeepAlive);
        let (tx, rx) = mpsc::channel::<Notification<T>>(config.feed_capacity_clamped());
        let rx = Arc::new(Mutex::new(Some(rx)));

        let source = Observable::create_with(config, move |sub: Subscriber<T>| {
            let rx = rx.lock().take();
            async move {
                let Some(mut rx) = rx else { return };
                while let Some(n) = rx.recv().await {
                    let last = n.is_terminal();
                    if !sub.notify(n).await || last {
                        break;
                    }
                }
            }
        });
        let output = source.publish();
        output.connect();

        Self {
            input: Mutex::new(Some(tx)),
            output,
        }
    }

    /// Pushes one value to every current subscriber.
    pub async fn next(&self, value: T) -> Result<(), SubjectError> {
        self.post(Notification::Next(value)).await
    }

    /// Fails the subject: subscribers get `Error` followed by `Complete`.
    pub async fn error(&self, cause: StreamError) -> Result<(), SubjectError> {
        self.post(Notification::Error(cause)).await
    }

    /// Completes the subject.
    pub async fn complete(&self) -> Result<(), SubjectError> {
        self.post(Notification::Complete).await
    }

    /// Pushes any notification. `Start` is ignored: subscribers are primed
    /// individually.
    pub async fn post(&self, notification: Notification<T>) -> Result<(), SubjectError> {
        if matches!(notification, Notification::Start) {
            return Ok(());
        }

        let tx = {
            let mut input = self.input.lock();
            if notification.is_terminal() {
                input.take()
            } else {
                input.clone()
            }
        };
        let tx = tx.ok_or(SubjectError::Closed)?;
        tx.send(notification)
            .await
            .map_err(|_| SubjectError::Closed)
    }

    /// Subscribes to the subject's output.
    pub fn subscribe(&self) -> Subscription<T> {
        self.output.subscribe()
    }

    /// Returns the observable side, for chaining operators.
    pub fn as_observable(&self) -> Observable<T> {
        self.output.clone()
    }

    /// True until the input is closed by `error` or `complete`.
    pub fn is_open(&self) -> bool {
        self.input.lock().is_some()
    }
}

impl<T: Value> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("open", &self.input.lock().is_some())
            .field("output", &self.output)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn drain<T: Value>(mut sub: Subscription<T>) -> Vec<Notification<T>> {
        let mut out = Vec::new();
        while let Some(n) = timeout(Duration::from_secs(2), sub.recv())
            .await
            .expect("stream stalled")
        {
            out.push(n);
        }
        out
    }

    #[tokio::test]
    async fn test_push_reaches_all_subscribers() {
        let subject = Subject::new();
        let a = tokio::spawn(drain(subject.subscribe()));
        let b = tokio::spawn(drain(subject.subscribe()));

        for i in 0..3u32 {
            subject.next(i).await.unwrap();
        }
        subject.complete().await.unwrap();

        let want = vec![
            Notification::Start,
            Notification::Next(0),
            Notification::Next(1),
            Notification::Next(2),
            Notification::Complete,
        ];
        assert_eq!(a.await.unwrap(), want);
        assert_eq!(b.await.unwrap(), want);
    }

    #[tokio::test]
    async fn test_error_then_closed() {
        let subject = Subject::<u32>::new();
        let sub = tokio::spawn(drain(subject.subscribe()));

        subject.error(StreamError::fail("boom")).await.unwrap();
        assert!(!subject.is_open());
        assert_eq!(subject.next(1).await, Err(SubjectError::Closed));
        assert_eq!(subject.complete().await, Err(SubjectError::Closed));

        assert_eq!(
            sub.await.unwrap(),
            vec![
                Notification::Start,
                Notification::Error(StreamError::fail("boom")),
                Notification::Complete
            ]
        );
    }

    #[tokio::test]
    async fn test_late_subscriber_after_complete() {
        let subject = Subject::<u32>::new();
        let early = subject.subscribe();
        subject.complete().await.unwrap();
        drain(early).await;

        let late = drain(subject.subscribe()).await;
        assert_eq!(late, vec![Notification::Start, Notification::Complete]);
    }

    #[tokio::test]
    async fn test_values_without_subscribers_are_dropped() {
        let subject = Subject::new();
        subject.next(1u32).await.unwrap();
        subject.next(2u32).await.unwrap();
        // Let the connected broadcaster drain both pushes to its empty target set.
        tokio::time::sleep(Duration::from_millis(20)).await;

        let mut sub = subject.subscribe();
        assert_eq!(sub.recv().await, Some(Notification::Start));
        let pusher = async {
            subject.next(3).await.unwrap();
            subject.complete().await.unwrap();
        };
        let (_, rest) = tokio::join!(pusher, drain(sub));
        let values: Vec<u32> = rest.into_iter().filter_map(Notification::into_value).collect();
        assert_eq!(values, vec![3]);
    }

    #[tokio::test]
    async fn test_dropping_subject_completes_subscribers() {
        let subject = Subject::<u8>::new();
        let mut sub = subject.subscribe();
        assert_eq!(sub.recv().await, Some(Notification::Start));
        drop(subject);
        assert_eq!(
            timeout(Duration::from_secs(2), sub.recv()).await.unwrap(),
            Some(Notification::Complete)
        );
    }

    #[tokio::test]
    async fn test_as_observable_chains_operators() {
        let subject = Subject::new();
        let doubled = subject.as_observable().map(|v: u32| v * 2);
        let sub = tokio::spawn(drain(doubled.subscribe()));
        tokio::task::yield_now().await;

        subject.next(21).await.unwrap();
        subject.complete().await.unwrap();
        let values: Vec<u32> = sub
            .await
            .unwrap()
            .into_iter()
            .filter_map(Notification::into_value)
            .collect();
        assert_eq!(values, vec![42]);
    }
}
