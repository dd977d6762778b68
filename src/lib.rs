//! # flowcast
//!
//! **Flowcast** is a reactive-stream runtime built on Tokio.
//!
//! It provides primitives to build, transform and multicast asynchronous
//! notification sequences ("observables") to any number of independently
//! paced consumers, with deterministic cancellation. Every hand-off is a
//! bounded channel, so a slow consumer slows its producer instead of growing
//! a queue.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Producer   │   │   Subject    │   │ mpsc channel │
//!     │ (user fn #1) │   │ (push input) │   │(from_channel)│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    Source    │   │    Source    │   │    Source    │
//!     │ (task / sub) │   │ (task / sub) │   │ (task / sub) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  │
//!     ┌──────────────┐   ┌──────────────┐          │
//!     │  Lift(map)   │   │  Published   │          │
//!     │ (pump task)  │   │ (fan-out)    │          │
//!     └──────┬───────┘   └─┬──────────┬─┘          │
//!            │             ▼          ▼            │
//!            │          target     target          │
//!            │                                     │
//!            └────────────────┐   ┌────────────────┘
//!                             ▼   ▼
//!                     ┌────────────────────┐
//!                     │  merge (SelectAll) │
//!                     └─────────┬──────────┘
//!                               ▼
//!                         Subscription::recv()
//! ```
//!
//! ### Lifecycle of one subscription
//! ```text
//! Observable::subscribe()
//!   ├─► create feed (bounded mpsc + Lifecycle)
//!   ├─► prime Start
//!   └─► spawn producer / pump
//!
//! deliveries:
//!   ├─ Start / Next ─► shared gate; dropped once ended or errored
//!   ├─ Error        ─► exclusive gate; mangled into Error + Complete at leaves
//!   └─ Complete     ─► exclusive gate; flips Active ─► Terminated
//!
//! termination (first trigger wins):
//!   ├─ Complete delivered
//!   └─ unsubscribe() / drop(Subscription)
//!        ├─ cancel token (unblocks a parked producer)
//!        └─ run hooks once, in order (upstream unsubscribe, broadcaster removal, ...)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                              |
//! |-------------------|---------------------------------------------------------------|-------------------------------------------------|
//! | **Notifications** | Closed event model with a fixed per-subscription grammar.     | [`Notification`], [`NotificationKind`]          |
//! | **Subscriptions** | Producer/consumer halves, hooks, idempotent cancellation.     | [`Subscriber`], [`Subscription`], [`SubscriptionRef`] |
//! | **Sources**       | Leaf observables from closures, channels or iterators.        | [`Observable`], [`Producer`], [`ProducerFn`]    |
//! | **Operators**     | Per-notification transformations between two feeds.           | [`Operator`], [`OperatorFn`], [`Map`], [`Filter`] |
//! | **Multicast**     | One upstream, many targets, lock-step fan-out.                | [`Observable::publish`], [`Teardown`]           |
//! | **Combinators**   | Interleave several sources; group cancellation.               | [`Observable::merge`], [`CompositeSubscription`] |
//! | **Subjects**      | Push values from imperative code into a multicast stream.     | [`Subject`]                                     |
//! | **Errors**        | Typed error causes and push errors.                           | [`StreamError`], [`SubjectError`]               |
//! | **Configuration** | Feed capacity and broadcaster teardown policy.                | [`Config`]                                      |
//!
//! ## Optional features
//! - `logging`: exports a tracing-based [`LogWriter`] tap and `Observable::log` _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use flowcast::{Notification, Observable};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let ticks = Observable::create(|sub| async move {
//!         for i in 0..5u32 {
//!             if !sub.next(i).await {
//!                 return; // every subscriber left
//!             }
//!         }
//!         sub.complete().await;
//!     });
//!
//!     // One upstream run shared by both subscribers.
//!     let shared = ticks.map(|i| i * 10).publish();
//!     let mut a = shared.subscribe();
//!     let mut b = shared.subscribe();
//!
//!     let (a, b) = tokio::join!(
//!         async move {
//!             let mut seen = Vec::new();
//!             while let Some(n) = a.recv().await {
//!                 seen.push(n);
//!             }
//!             seen
//!         },
//!         async move {
//!             let mut seen = Vec::new();
//!             while let Some(n) = b.recv().await {
//!                 seen.push(n);
//!             }
//!             seen
//!         },
//!     );
//!     assert_eq!(a, b);
//!     assert_eq!(a.last(), Some(&Notification::Complete));
//! }
//! ```
mod config;
mod error;
mod notification;
mod observable;
mod operators;
mod policies;
mod subject;
mod subscription;

// ---- Public re-exports ----

pub use config::Config;
pub use error::{StreamError, SubjectError};
pub use notification::{Notification, NotificationKind, Value};
pub use observable::{BoxProducerFuture, Observable, Operator, OperatorFn, Producer, ProducerFn};
pub use operators::{Filter, Map, Passthrough};
pub use policies::Teardown;
pub use subject::Subject;
pub use subscription::{
    Cancellable, CompositeSubscription, Subscriber, Subscription, SubscriptionRef,
};

// Optional: expose a simple built-in logging tap (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use operators::LogWriter;
