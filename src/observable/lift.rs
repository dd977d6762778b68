//! # Lifted stage: one operator between an upstream and a downstream feed.
//!
//! ```text
//! subscribe()
//!   ├─► upstream.subscribe()
//!   ├─► channel(Forward) + hook: downstream ended ─► upstream.unsubscribe()
//!   └─► spawn pump:
//!         loop {
//!           select! { downstream cancelled ─► stop, upstream.recv() }
//!           stop if downstream ended;  operator.notify(downstream, n)
//!           stop after Complete or once downstream no longer takes values
//!         }
//!         downstream.complete()   (no-op if the operator already did)
//! ```

use std::sync::Arc;

use crate::config::Config;
use crate::notification::Value;
use crate::observable::{Observable, Operator, Subscribe};
use crate::subscription::feed::{self, ErrorMode};
use crate::subscription::Subscription;

pub(crate) struct Lift<In, Out> {
    upstream: Observable<In>,
    operator: Arc<dyn Operator<In, Out>>,
    config: Config,
}

impl<In: Value, Out: Value> Lift<In, Out> {
    pub(crate) fn new(
        upstream: Observable<In>,
        operator: Arc<dyn Operator<In, Out>>,
        config: Config,
    ) -> Self {
        Self {
            upstream,
            operator,
            config,
        }
    }
}

impl<In: Value, Out: Value> Subscribe<Out> for Lift<In, Out> {
    fn subscribe(&self) -> Subscription<Out> {
        let mut upstream = self.upstream.subscribe();
        let (downstream, subscription) = feed::channel(&self.config, ErrorMode::Forward);

        let upstream_ref = upstream.handle();
        downstream.add(move || upstream_ref.unsubscribe());

        let operator = Arc::clone(&self.operator);
        tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    _ = downstream.cancelled() => None,
                    n = upstream.recv() => n,
                };
                let Some(n) = received else { break };
                if !downstream.is_subscribed() {
                    break;
                }

                let last = n.is_complete();
                operator.notify(&downstream, n).await;
                if last || !downstream.accepts_values() {
                    break;
                }
            }
            downstream.complete().await;
            tracing::trace!(
                upstream_live = upstream.is_subscribed(),
                "lifted stage ended"
            );
        });
        subscription
    }
}
