//! # Example: fan_in
//!
//! Fans out 1000 jobs with random durations and merges their results two ways:
//! - through an [`OrderedChain`]: results come back in submission order;
//! - through a plain mpsc channel: results come back in completion order.
//!
//! Demonstrates how to:
//! - Reserve a [`Slot`](taskorder::Slot) per job before spawning it.
//! - Resolve the slot from the job and wait for the whole chain.
//! - Observe chain logs with `tracing` (set `RUST_LOG=taskorder=trace`).
//!
//! ## Run
//! ```bash
//! RUST_LOG=taskorder=debug cargo run --example fan_in
//! ```

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::Rng;
use taskorder::{Config, OrderedChain};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const JOBS: usize = 1000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 1. Random job durations (1..=20ms)
    let mut rng = rand::rng();
    let jobs: Vec<u64> = (0..JOBS).map(|_| rng.random_range(1..=20)).collect();

    // 2. Ordered fan-in
    let started = Instant::now();
    let chain = OrderedChain::with_config(Config {
        stall_warning: Duration::from_millis(500),
        ..Config::labeled("fan-in")
    });
    let ordered = Arc::new(Mutex::new(Vec::with_capacity(JOBS)));
    for &ms in &jobs {
        let slot = chain.reserve();
        let ordered = ordered.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            slot.resolve(|| {
                if let Ok(mut out) = ordered.lock() {
                    out.push(ms);
                }
            })
            .await;
        });
    }
    chain.wait().await;
    let ordered_took = started.elapsed();
    let ordered = ordered.lock().map(|v| v.clone()).unwrap_or_default();

    // 3. Unordered fan-in for comparison
    let started = Instant::now();
    let (tx, mut rx) = mpsc::unbounded_channel();
    for &ms in &jobs {
        let tx = tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            let _ = tx.send(ms);
        });
    }
    drop(tx);
    let mut unordered = Vec::with_capacity(JOBS);
    while let Some(ms) = rx.recv().await {
        unordered.push(ms);
    }
    let unordered_took = started.elapsed();

    println!(
        "[ordered]   took={ordered_took:?} matches_submission={}",
        ordered == jobs
    );
    println!(
        "[unordered] took={unordered_took:?} matches_submission={}",
        unordered == jobs
    );
}
