// SPDX-License-Identifier: AGPL-3.0
// Lanshare Core - Download counter and shutdown signal
//
// The counter is owned by the bounded file handler. Holding its lock covers
// the whole check / open / decrement / signal sequence, so exhaustion is
// observed by exactly one request.

use crate::types::ServeError;
use std::fmt;
use tokio::sync::{watch, Mutex, MutexGuard};

/// How many more successful downloads are permitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Remaining {
    #[default]
    Unlimited,
    Limited(u64),
}

impl Remaining {
    /// Parse the command-line count: `-1` means unlimited, otherwise a positive integer
    pub fn from_count(count: i64) -> Result<Self, ServeError> {
        match count {
            -1 => Ok(Self::Unlimited),
            n if n > 0 => Ok(Self::Limited(n as u64)),
            n => Err(ServeError::InvalidCount(format!(
                "{} (expected -1 for unlimited or a positive number)",
                n
            ))),
        }
    }

    /// Parse a count given as text
    pub fn parse(raw: &str) -> Result<Self, ServeError> {
        let count: i64 = raw
            .trim()
            .parse()
            .map_err(|_| ServeError::InvalidCount(raw.to_string()))?;
        Self::from_count(count)
    }

    /// Numeric form: `-1` for unlimited
    pub fn as_count(&self) -> i64 {
        match self {
            Self::Unlimited => -1,
            Self::Limited(n) => *n as i64,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Limited(0))
    }

    /// Downloads left after the one being served, when worth reporting
    pub fn after_this(&self) -> Option<u64> {
        match self {
            Self::Limited(n) if *n > 1 => Some(n - 1),
            _ => None,
        }
    }

    /// Consume one download. Returns true when this call used up the last one.
    pub fn consume(&mut self) -> bool {
        match self {
            Self::Limited(n) if *n > 0 => {
                *n -= 1;
                *n == 0
            }
            _ => false,
        }
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => write!(f, "unlimited"),
            Self::Limited(n) => write!(f, "{}", n),
        }
    }
}

/// Shared remaining-download counter
#[derive(Debug)]
pub struct DownloadCounter {
    remaining: Mutex<Remaining>,
}

impl DownloadCounter {
    pub fn new(remaining: Remaining) -> Self {
        Self {
            remaining: Mutex::new(remaining),
        }
    }

    /// Lock the counter for a read-modify-write sequence
    pub async fn lock(&self) -> MutexGuard<'_, Remaining> {
        self.remaining.lock().await
    }

    /// Current value
    pub async fn remaining(&self) -> Remaining {
        *self.remaining.lock().await
    }
}

/// One-way signal asking the serve loop to stop accepting connections
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Ask the server to shut down; later calls are no-ops
    pub fn request(&self) {
        self.tx.send_if_modified(|requested| {
            if *requested {
                false
            } else {
                *requested = true;
                true
            }
        });
    }

    pub fn is_requested(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once shutdown has been requested
    pub async fn requested(&self) {
        let mut rx = self.tx.subscribe();
        // Sender lives in self, so wait_for only fails if it was dropped
        let _ = rx.wait_for(|requested| *requested).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_parse_counts() {
        assert_eq!(Remaining::parse("-1").unwrap(), Remaining::Unlimited);
        assert_eq!(Remaining::parse("3").unwrap(), Remaining::Limited(3));
        assert_eq!(Remaining::parse(" 2 ").unwrap(), Remaining::Limited(2));
        assert!(Remaining::parse("0").is_err());
        assert!(Remaining::parse("-2").is_err());
        assert!(Remaining::parse("many").is_err());
    }

    #[test]
    fn test_consume_limited() {
        let mut remaining = Remaining::Limited(2);
        assert!(!remaining.consume());
        assert_eq!(remaining, Remaining::Limited(1));
        assert!(remaining.consume());
        assert!(remaining.is_exhausted());
        // Never goes below zero
        assert!(!remaining.consume());
        assert_eq!(remaining.as_count(), 0);
    }

    #[test]
    fn test_consume_unlimited() {
        let mut remaining = Remaining::Unlimited;
        for _ in 0..100 {
            assert!(!remaining.consume());
        }
        assert_eq!(remaining.as_count(), -1);
    }

    #[test]
    fn test_after_this_annotation() {
        assert_eq!(Remaining::Limited(3).after_this(), Some(2));
        assert_eq!(Remaining::Limited(1).after_this(), None);
        assert_eq!(Remaining::Unlimited.after_this(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_consumers_exhaust_once() {
        let counter = Arc::new(DownloadCounter::new(Remaining::Limited(10)));
        let mut handles = Vec::new();

        for _ in 0..50 {
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let mut guard = counter.lock().await;
                guard.consume()
            }));
        }

        let mut last_count = 0;
        for handle in handles {
            if handle.await.unwrap() {
                last_count += 1;
            }
        }

        assert_eq!(last_count, 1);
        assert_eq!(counter.remaining().await, Remaining::Limited(0));
    }

    #[tokio::test]
    async fn test_shutdown_signal() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_requested());

        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.requested().await })
        };

        signal.request();
        signal.request();
        assert!(signal.is_requested());
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish")
            .unwrap();

        // Already requested: resolves immediately
        tokio::time::timeout(Duration::from_secs(1), signal.requested())
            .await
            .expect("should resolve immediately");
    }
}
