//! # Example: Publish fan-out
//!
//! One ticking source, three subscribers with different speeds.
//! The fast ones wait for the slow one at every step; nobody loses a value.
//! The middle subscriber leaves early without disturbing the others.

use std::time::Duration;

use flowcast::{Config, Notification, Observable, Subscription, Teardown};

async fn consume(name: &'static str, mut sub: Subscription<u64>, delay_ms: u64, take: usize) {
    let mut seen = 0;
    while let Some(n) = sub.recv().await {
        match n {
            Notification::Start => println!("[{name}] start"),
            Notification::Next(v) => {
                println!("[{name}] next {v}");
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                seen += 1;
                if seen == take {
                    println!("[{name}] leaving");
                    sub.unsubscribe();
                }
            }
            Notification::Error(e) => println!("[{name}] error {}", e.as_message()),
            Notification::Complete => println!("[{name}] complete"),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let ticks = Observable::create(|sub| async move {
        for i in 0..6u64 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if !sub.next(i).await {
                return;
            }
        }
        sub.complete().await;
    });

    let cfg = Config::default().with_teardown(Teardown::WhenEmpty);
    let shared = ticks.map(|i| i * i).with_config(cfg).publish();

    let fast = shared.subscribe();
    let quitter = shared.subscribe();
    let slow = shared.subscribe();

    tokio::join!(
        consume("fast", fast, 0, usize::MAX),
        consume("quitter", quitter, 5, 2),
        consume("slow", slow, 50, usize::MAX),
    );

    println!("late subscriber:");
    consume("late", shared.subscribe(), 0, usize::MAX).await;
    Ok(())
}
