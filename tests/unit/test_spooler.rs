//! Unit tests for the message spooler

use printquest::spool::{self, Pull};
use std::time::Duration;

#[cfg(test)]
mod spooler_tests {
    use super::*;

    /// For all queue sizes n and lookbacks N: after a drain the queue holds
    /// min(n, N+1) commands, and they are the freshest in original order.
    #[tokio::test]
    async fn test_spool_invariant_across_sizes() {
        for lookback in 0..4usize {
            for n in 0..10usize {
                let (tx, mut spooler) = spool::channel(lookback);
                for i in 0..n {
                    tx.submit("author", format!("cmd {}", i));
                }

                let dropped = spooler.spool_drop();
                let expected_kept = n.min(lookback + 1);
                assert_eq!(dropped, n - expected_kept, "n={} N={}", n, lookback);
                assert_eq!(spooler.pending(), expected_kept, "n={} N={}", n, lookback);

                // Survivors are exactly the most recent, in order
                for i in (n - expected_kept)..n {
                    match spooler.pull(Duration::from_millis(50)).await {
                        Pull::Command(cmd) => assert_eq!(cmd.text, format!("cmd {}", i)),
                        other => panic!("expected command {}, got {:?}", i, other),
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_drop_never_reorders() {
        let (tx, mut spooler) = spool::channel(2);
        for i in 0..8 {
            tx.submit("author", format!("{}", i));
        }
        spooler.spool_drop();

        let mut seen = Vec::new();
        while let Pull::Command(cmd) = spooler.pull(Duration::from_millis(20)).await {
            seen.push(cmd.text.parse::<u32>().unwrap());
        }
        let mut sorted = seen.clone();
        sorted.sort();
        assert_eq!(seen, sorted);
    }

    #[tokio::test]
    async fn test_pull_timeout_signals_empty() {
        let (_tx, mut spooler) = spool::channel(1);
        let started = std::time::Instant::now();
        assert!(matches!(
            spooler.pull(Duration::from_millis(30)).await,
            Pull::Empty
        ));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_closed_queue_signals_closed() {
        let (tx, mut spooler) = spool::channel(1);
        tx.submit("author", "last words");
        drop(tx);

        // Buffered commands drain before the close is observed
        assert!(matches!(
            spooler.pull(Duration::from_millis(50)).await,
            Pull::Command(_)
        ));
        assert!(matches!(
            spooler.pull(Duration::from_millis(50)).await,
            Pull::Closed
        ));
    }

    #[tokio::test]
    async fn test_concurrent_producers() {
        let (tx, mut spooler) = spool::channel(100);
        let mut handles = Vec::new();
        for p in 0..4 {
            let tx = tx.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..10 {
                    tx.submit(format!("producer{}", p), format!("cmd {}", i));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(spooler.pending(), 40);
        assert_eq!(spooler.spool_drop(), 0);
    }
}
