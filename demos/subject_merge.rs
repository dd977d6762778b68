//! # Example: Subjects merged into one logged stream
//!
//! Two subjects are fed from separate tasks; the merged stream is tapped with
//! `LogWriter` and drained. Run with:
//!
//! ```text
//! RUST_LOG=info cargo run --example subject_merge --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use flowcast::{Observable, StreamError, Subject};
use futures::StreamExt;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let prices = Arc::new(Subject::<String>::new());
    let alerts = Arc::new(Subject::<String>::new());

    let merged = Observable::merge([
        prices.as_observable().map(|p| format!("price {p}")),
        alerts.as_observable().map(|a| format!("alert {a}")),
    ])
    .log("feed");
    let values = merged.subscribe().values();

    let p = Arc::clone(&prices);
    let price_feed = tokio::spawn(async move {
        for price in ["101.5", "101.7", "101.2"] {
            p.next(price.to_string()).await?;
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        p.complete().await
    });

    let a = Arc::clone(&alerts);
    let alert_feed = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(15)).await;
        a.next("spread widening".to_string()).await?;
        a.error(StreamError::fail("alert source lost")).await
    });

    let collected: Vec<String> = values.collect().await;
    price_feed.await??;
    alert_feed.await??;

    println!("collected {} values:", collected.len());
    for v in collected {
        println!("  {v}");
    }
    Ok(())
}
