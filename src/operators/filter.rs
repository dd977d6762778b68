use async_trait::async_trait;

use crate::notification::{Notification, Value};
use crate::observable::Operator;
use crate::subscription::Subscriber;

/// Drops `Next` payloads failing a predicate; everything else passes.
///
/// Built by [`Observable::filter`](crate::Observable::filter).
pub struct Filter<P> {
    predicate: P,
}

impl<P> Filter<P> {
    /// Wraps the predicate; `true` keeps the value.
    pub fn new(predicate: P) -> Self {
        Self { predicate }
    }
}

#[async_trait]
impl<T, P> Operator<T, T> for Filter<P>
where
    T: Value,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    async fn notify(&self, downstream: &Subscriber<T>, notification: Notification<T>) {
        let keep = match &notification {
            Notification::Next(value) => (self.predicate)(value),
            Notification::Start | Notification::Error(_) | Notification::Complete => true,
        };
        if keep {
            downstream.notify(notification).await;
        }
    }
}
