//! # Subscription lifecycle state machine.
//!
//! Tracks liveness of one feed and runs its completion hooks exactly once.
//!
//! ## States
//! ```text
//!             Complete delivered ──► Terminated(Completed)
//! Active ──┤
//!             unsubscribe / drop ──► Terminated(Unsubscribed)
//! ```
//! The first trigger wins; every later trigger observes the terminated state
//! and returns without side effects.
//!
//! ## Locks
//! - `gate` (Tokio `RwLock`): value deliveries hold it shared, terminal deliveries
//!   hold it exclusive, so nothing can slip in between a `Complete` and the flip.
//! - `state` (`parking_lot::Mutex`): termination flag and hook list; never held
//!   across an await or while hooks run.
//! - `token` (`CancellationToken`): fired after the flip; every blocking send and
//!   every pending `recv` races against it.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Completion hook: runs once when the subscription terminates.
pub(crate) type Hook = Box<dyn FnOnce() + Send + 'static>;

/// How a subscription terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Termination {
    /// `Complete` was handed to the consumer.
    Completed,
    /// Cancelled before completion (explicit unsubscribe, drop, consumer gone).
    Unsubscribed,
}

struct State {
    termination: Option<Termination>,
    errored: bool,
    hooks: Vec<Hook>,
}

/// Shared lifecycle of one subscription.
pub(crate) struct Lifecycle {
    gate: RwLock<()>,
    token: CancellationToken,
    state: Mutex<State>,
}

impl Lifecycle {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: RwLock::new(()),
            token: CancellationToken::new(),
            state: Mutex::new(State {
                termination: None,
                errored: false,
                hooks: Vec::new(),
            }),
        })
    }

    #[inline]
    pub(crate) fn gate(&self) -> &RwLock<()> {
        &self.gate
    }

    #[inline]
    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub(crate) fn is_subscribed(&self) -> bool {
        self.state.lock().termination.is_none()
    }

    pub(crate) fn termination(&self) -> Option<Termination> {
        self.state.lock().termination
    }

    /// True while `Next`/`Error` may still be delivered.
    pub(crate) fn accepts_values(&self) -> bool {
        let state = self.state.lock();
        state.termination.is_none() && !state.errored
    }

    pub(crate) fn mark_errored(&self) {
        self.state.lock().errored = true;
    }

    /// Registers a hook; runs it right away when already terminated.
    pub(crate) fn add(&self, hook: Hook) {
        let mut state = self.state.lock();
        if state.termination.is_some() {
            drop(state);
            hook();
            return;
        }
        state.hooks.push(hook);
    }

    /// Performs the one-way transition. Returns `false` if another caller won.
    ///
    /// Hooks run on the calling thread, in registration order, after the lock
    /// is released.
    pub(crate) fn terminate(&self, reason: Termination) -> bool {
        let hooks = {
            let mut state = self.state.lock();
            if state.termination.is_some() {
                return false;
            }
            state.termination = Some(reason);
            std::mem::take(&mut state.hooks)
        };
        self.token.cancel();

        tracing::trace!(?reason, hooks = hooks.len(), "subscription terminated");
        for hook in hooks {
            hook();
        }
        true
    }
}

/// Clonable control handle of a subscription.
///
/// Obtained from [`Subscription::handle`](crate::Subscription::handle) or
/// [`Subscriber::handle`](crate::Subscriber::handle). Holding it does not keep
/// the feed open; it only lets the holder observe and cancel it.
#[derive(Clone)]
pub struct SubscriptionRef {
    lifecycle: Arc<Lifecycle>,
}

impl SubscriptionRef {
    pub(crate) fn new(lifecycle: Arc<Lifecycle>) -> Self {
        Self { lifecycle }
    }

    /// True until the subscription terminates. Flips exactly once.
    pub fn is_subscribed(&self) -> bool {
        self.lifecycle.is_subscribed()
    }

    /// Cancels the subscription. Idempotent; safe from any number of callers.
    pub fn unsubscribe(&self) {
        self.lifecycle.terminate(Termination::Unsubscribed);
    }

    /// Registers a completion hook (runs immediately if already terminated).
    pub fn add(&self, hook: impl FnOnce() + Send + 'static) {
        self.lifecycle.add(Box::new(hook));
    }

    /// Completes once the subscription has terminated, for any reason.
    pub async fn terminated(&self) {
        self.lifecycle.token().cancelled().await
    }
}

impl fmt::Debug for SubscriptionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRef")
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}
