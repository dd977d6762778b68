use async_trait::async_trait;

use crate::notification::{Notification, Value};
use crate::observable::Operator;
use crate::subscription::Subscriber;

/// Identity stage. Paired with a wider feed it decouples producer and consumer;
/// see [`Observable::buffered`](crate::Observable::buffered).
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

#[async_trait]
impl<T: Value> Operator<T, T> for Passthrough {
    async fn notify(&self, downstream: &Subscriber<T>, notification: Notification<T>) {
        downstream.notify(notification).await;
    }
}
