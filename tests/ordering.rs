use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::join_all;
use rand::Rng;
use taskorder::{Abandoned, Config, OrderedChain, OrderedQueue};
use tokio::time::{sleep, timeout};

const JOBS: [u64; 9] = [4, 15, 3, 7, 1, 3, 23, 10, 5];

fn random_delays(n: usize, range: u64) -> Vec<u64> {
    let mut rng = rand::rng();
    (0..n).map(|_| rng.random_range(1..=range)).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_results_follow_submission_order() {
    for _ in 0..20 {
        let chain = OrderedChain::new();
        let results = Arc::new(Mutex::new(Vec::new()));

        for delay in JOBS {
            let slot = chain.reserve();
            let results = results.clone();
            tokio::spawn(async move {
                sleep(Duration::from_millis(delay)).await;
                slot.resolve(|| results.lock().unwrap().push(delay)).await;
            });
        }

        chain.wait().await;
        assert_eq!(*results.lock().unwrap(), JOBS.to_vec());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_random_delays_keep_order() {
    let delays = random_delays(200, 20);
    let chain = OrderedChain::with_config(Config::labeled("random"));
    let results = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = delays
        .iter()
        .copied()
        .enumerate()
        .map(|(idx, delay)| {
            let slot = chain.reserve();
            let results = results.clone();
            tokio::spawn(async move {
                sleep(Duration::from_millis(delay)).await;
                slot.resolve(|| results.lock().unwrap().push(idx)).await;
            })
        })
        .collect();

    chain.wait().await;
    for h in join_all(handles).await {
        h.expect("worker panicked");
    }
    assert_eq!(*results.lock().unwrap(), (0..200).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_actions_run_once_and_never_overlap() {
    const N: usize = 64;
    let chain = OrderedChain::new();
    let active = Arc::new(AtomicUsize::new(0));
    let runs: Arc<Vec<AtomicUsize>> = Arc::new((0..N).map(|_| AtomicUsize::new(0)).collect());

    let handles: Vec<_> = random_delays(N, 5)
        .into_iter()
        .enumerate()
        .map(|(idx, delay)| {
            let slot = chain.reserve();
            let active = active.clone();
            let runs = runs.clone();
            tokio::spawn(async move {
                sleep(Duration::from_millis(delay)).await;
                slot.resolve(|| {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    assert_eq!(now, 1, "two actions overlapped");
                    std::thread::sleep(Duration::from_micros(200));
                    runs[idx].fetch_add(1, Ordering::SeqCst);
                    active.fetch_sub(1, Ordering::SeqCst);
                })
                .await;
            })
        })
        .collect();

    for h in join_all(handles).await {
        h.expect("worker panicked");
    }
    chain.wait().await;
    assert!(runs.iter().all(|r| r.load(Ordering::SeqCst) == 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_double_resolve_fails_only_the_calling_task() {
    let chain = OrderedChain::with_config(Config::labeled("double"));
    let slot = chain.reserve();

    let handle = tokio::spawn(async move {
        slot.resolve(|| ()).await;
        slot.resolve(|| ()).await;
    });

    let err = handle.await.expect_err("second resolve must fail");
    assert!(err.is_panic());
    let msg = err
        .into_panic()
        .downcast::<String>()
        .map(|s| *s)
        .unwrap_or_default();
    assert!(msg.contains("slot #1"), "unexpected diagnostic: {msg}");
    assert!(msg.contains("resolved more than once"), "unexpected diagnostic: {msg}");

    // chain still usable
    chain.reserve().resolve(|| ()).await;
    chain.wait().await;
}

#[tokio::test]
async fn test_wait_on_empty_chain_returns_immediately() {
    let chain = OrderedChain::new();
    timeout(Duration::from_millis(10), chain.wait())
        .await
        .expect("empty chain blocked");

    let queue = OrderedQueue::new();
    timeout(Duration::from_millis(10), queue.wait())
        .await
        .expect("empty queue blocked");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_skip_and_abandon_release_successors() {
    let queue = OrderedQueue::new();
    let results = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = JOBS
        .into_iter()
        .map(|delay| {
            let slot = queue.reserve();
            let results = results.clone();
            tokio::spawn(async move {
                sleep(Duration::from_millis(delay)).await;
                match delay {
                    3 => slot.skip().await,
                    1 => {
                        slot.abandon().await?;
                    }
                    _ => slot.resolve(|| results.lock().unwrap().push(delay)).await,
                }
                Ok::<_, Abandoned>(delay)
            })
        })
        .collect();

    queue.wait().await;
    assert_eq!(*results.lock().unwrap(), vec![4, 15, 7, 23, 10, 5]);

    let outcomes: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|h| h.expect("worker panicked"))
        .collect();
    let abandoned: Vec<u64> = outcomes
        .iter()
        .filter_map(|o| o.as_ref().err().map(|e| e.seq))
        .collect();
    assert_eq!(abandoned, vec![5]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_panicking_worker_does_not_stall_chain() {
    let chain = OrderedChain::new();
    let results = Arc::new(Mutex::new(Vec::new()));

    for (idx, delay) in [20u64, 1, 10, 2].into_iter().enumerate() {
        let slot = chain.reserve();
        let results = results.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(delay)).await;
            if idx == 1 {
                panic!("worker {idx} failed before resolving");
            }
            slot.resolve(|| results.lock().unwrap().push(idx)).await;
        });
    }

    timeout(Duration::from_secs(2), chain.wait())
        .await
        .expect("chain deadlocked after a worker panic");
    assert_eq!(*results.lock().unwrap(), vec![0, 2, 3]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_aborted_worker_keeps_order_of_the_rest() {
    let chain = OrderedChain::new();
    let results = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for (idx, delay) in [30u64, 500, 5].into_iter().enumerate() {
        let slot = chain.reserve();
        let results = results.clone();
        handles.push(tokio::spawn(async move {
            sleep(Duration::from_millis(delay)).await;
            slot.resolve(|| results.lock().unwrap().push(idx)).await;
        }));
    }

    sleep(Duration::from_millis(10)).await;
    handles[1].abort();

    timeout(Duration::from_secs(2), chain.wait())
        .await
        .expect("chain deadlocked after abort");
    assert_eq!(*results.lock().unwrap(), vec![0, 2]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_waiters_and_concurrent_reservations() {
    let chain = Arc::new(OrderedChain::new());
    let results = Arc::new(Mutex::new(Vec::new()));

    let producers: Vec<_> = (0..16)
        .map(|_| {
            let chain = chain.clone();
            let results = results.clone();
            tokio::spawn(async move {
                let slot = chain.reserve();
                let seq = slot.seq();
                sleep(Duration::from_millis(17 - seq.min(16))).await;
                slot.resolve(|| results.lock().unwrap().push(seq)).await;
            })
        })
        .collect();
    for h in join_all(producers).await {
        h.expect("producer panicked");
    }

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let chain = chain.clone();
            tokio::spawn(async move { chain.wait().await })
        })
        .collect();
    for h in join_all(waiters).await {
        h.expect("waiter panicked");
    }

    assert_eq!(chain.reserved(), 16);
    assert_eq!(*results.lock().unwrap(), (1..=16).collect::<Vec<u64>>());
}

#[test]
fn test_plain_threads_keep_order() {
    let chain = OrderedChain::new();
    let results = Arc::new(Mutex::new(Vec::new()));

    let workers: Vec<_> = JOBS
        .into_iter()
        .map(|delay| {
            let slot = chain.reserve();
            let results = results.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(delay));
                slot.resolve_blocking(|| results.lock().unwrap().push(delay));
            })
        })
        .collect();

    chain.wait_blocking();
    assert_eq!(*results.lock().unwrap(), JOBS.to_vec());
    for w in workers {
        w.join().expect("worker thread panicked");
    }
}

#[test]
fn test_mass_dropped_slots_release_without_overflow() {
    let chain = OrderedChain::new();
    let slots: Vec<_> = (0..200_000).map(|_| chain.reserve()).collect();
    drop(slots);
    assert!(chain.is_idle());
    drop(chain);

    // tail-first drops nest every hand-over inside the next one
    let chain = OrderedChain::new();
    let first = chain.reserve();
    let mut slots: Vec<_> = (0..200_000).map(|_| chain.reserve()).collect();
    while let Some(slot) = slots.pop() {
        drop(slot);
    }
    assert!(!chain.is_idle());
    first.resolve_blocking(|| ());
    chain.wait_blocking();
    drop(first);
    drop(chain);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_timed_out_resolve_then_skip() {
    let queue = OrderedQueue::new();
    let results = Arc::new(Mutex::new(Vec::new()));

    let first = queue.reserve();
    let second = queue.reserve();
    let third = queue.reserve();

    let giving_up = {
        let results = results.clone();
        tokio::spawn(async move {
            let pushed = timeout(
                Duration::from_millis(10),
                second.resolve(|| results.lock().unwrap().push(2)),
            )
            .await;
            assert!(pushed.is_err());
            second.skip().await;
        })
    };
    let last = {
        let results = results.clone();
        tokio::spawn(async move { third.resolve(|| results.lock().unwrap().push(3)).await })
    };

    sleep(Duration::from_millis(30)).await;
    first.resolve(|| results.lock().unwrap().push(1)).await;

    giving_up.await.expect("skip after timeout must not panic");
    last.await.expect("successor panicked");
    queue.wait().await;
    assert_eq!(*results.lock().unwrap(), vec![1, 3]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_async_actions_keep_order_and_never_overlap() {
    const N: usize = 24;
    let chain = OrderedChain::new();
    let active = Arc::new(AtomicUsize::new(0));
    let results = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = random_delays(N, 10)
        .into_iter()
        .enumerate()
        .map(|(idx, delay)| {
            let slot = chain.reserve();
            let active = active.clone();
            let results = results.clone();
            tokio::spawn(async move {
                sleep(Duration::from_millis(delay)).await;
                slot.resolve_async(|| async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    assert_eq!(now, 1, "two async actions overlapped");
                    sleep(Duration::from_millis(2)).await;
                    results.lock().unwrap().push(idx);
                    active.fetch_sub(1, Ordering::SeqCst);
                })
                .await;
            })
        })
        .collect();

    for h in join_all(handles).await {
        h.expect("worker panicked");
    }
    chain.wait().await;
    assert_eq!(*results.lock().unwrap(), (0..N).collect::<Vec<_>>());
}
