use async_trait::async_trait;

use crate::notification::{Notification, Value};
use crate::observable::Operator;
use crate::subscription::Subscriber;

/// Applies a function to every `Next` payload.
///
/// Built by [`Observable::map`](crate::Observable::map).
pub struct Map<F> {
    f: F,
}

impl<F> Map<F> {
    /// Wraps the payload transformation.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<In, Out, F> Operator<In, Out> for Map<F>
where
    In: Value,
    Out: Value,
    F: Fn(In) -> Out + Send + Sync + 'static,
{
    async fn notify(&self, downstream: &Subscriber<Out>, notification: Notification<In>) {
        downstream.notify(notification.map(&self.f)).await;
    }
}
