//! # Operator abstraction and function-backed operator.
//!
//! An [`Operator`] sees every upstream notification of a lifted stage together
//! with the downstream [`Subscriber`], and decides what to forward: nothing,
//! one notification, or several.
//!
//! Operators are shared by every subscription of the stage, so per-subscription
//! state does not belong in `self`; capture an `Arc<...>` explicitly if state
//! must be shared.

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::notification::{Notification, Value};
use crate::subscription::Subscriber;

/// # Transformation applied by a lifted stage.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use flowcast::{Notification, Operator, Subscriber};
///
/// /// Emits every value twice.
/// struct Twice;
///
/// #[async_trait]
/// impl Operator<u32, u32> for Twice {
///     async fn notify(&self, downstream: &Subscriber<u32>, n: Notification<u32>) {
///         if let Notification::Next(v) = &n {
///             downstream.next(*v).await;
///         }
///         downstream.notify(n).await;
///     }
/// }
/// ```
#[async_trait]
pub trait Operator<In: Value, Out: Value>: Send + Sync + 'static {
    /// Handles one upstream notification.
    ///
    /// Returning without forwarding `Complete` is fine: the stage completes the
    /// downstream itself once upstream ends.
    async fn notify(&self, downstream: &Subscriber<Out>, notification: Notification<In>);
}

/// Closure-backed operator.
///
/// Wraps `F: Fn(Subscriber<Out>, Notification<In>) -> Fut`.
///
/// ## Example
/// ```rust
/// use flowcast::{Notification, Observable, OperatorFn, Subscriber};
///
/// let source = Observable::from_iter(vec![1u32, 2, 3]);
/// let labels = source.lift(OperatorFn::new(
///     |down: Subscriber<String>, n: Notification<u32>| async move {
///         down.notify(n.map(|v| format!("#{v}"))).await;
///     },
/// ));
/// # let _ = labels;
/// ```
pub struct OperatorFn<In, Out, F> {
    f: F,
    _types: PhantomData<fn(In) -> Out>,
}

impl<In, Out, F> OperatorFn<In, Out, F> {
    /// Wraps an operator closure.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _types: PhantomData,
        }
    }
}

#[async_trait]
impl<In, Out, F, Fut> Operator<In, Out> for OperatorFn<In, Out, F>
where
    In: Value,
    Out: Value,
    F: Fn(Subscriber<Out>, Notification<In>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn notify(&self, downstream: &Subscriber<Out>, notification: Notification<In>) {
        (self.f)(downstream.clone(), notification).await
    }
}
