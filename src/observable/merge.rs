//! # Merge: interleave notifications of several sources.
//!
//! Every source is subscribed when the merged observable is subscribed. Their
//! feeds are polled together through a [`SelectAll`]; a finished source simply
//! drops out of the set and the merged stream completes once the set is empty.
//!
//! Only per-source order is preserved. `Start` and `Complete` of the sources
//! are swallowed: the merged feed has its own. Cancelling the merged
//! subscription cancels every source still running through a
//! [`CompositeSubscription`].

use futures::StreamExt;
use futures::stream::SelectAll;

use crate::config::Config;
use crate::notification::{Notification, Value};
use crate::observable::Observable;
use crate::subscription::{Cancellable, CompositeSubscription, Subscriber};

pub(crate) fn merge<T: Value>(sources: Vec<Observable<T>>, config: Config) -> Observable<T> {
    Observable::create_with(config, move |downstream: Subscriber<T>| {
        let sources = sources.clone();
        async move {
            let children = CompositeSubscription::new();
            let mut live = SelectAll::new();
            for source in &sources {
                let subscription = source.subscribe();
                children.add(subscription.handle());
                live.push(Box::pin(subscription.into_stream()));
            }

            let on_cancel = children.clone();
            downstream.add(move || on_cancel.unsubscribe());
            tracing::trace!(sources = live.len(), "merge started");

            while let Some(n) = live.next().await {
                match n {
                    Notification::Start | Notification::Complete => continue,
                    n @ (Notification::Next(_) | Notification::Error(_)) => {
                        if !downstream.notify(n).await {
                            break;
                        }
                    }
                }
            }
            children.unsubscribe();
        }
    })
}
