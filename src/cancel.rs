use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How often a timeout watcher looks at the flag.
const WATCH_INTERVAL: Duration = Duration::from_millis(5);

/// Cooperative cancellation flag shared between a caller and a running
/// calculation. Clones observe the same flag. Once cancelled a token stays
/// cancelled, so use a fresh one per calculation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Cancels this token from a background thread once `timeout` elapses.
    /// The watcher exits early if the token is cancelled first; cancel it
    /// after the calculation returns to release the thread.
    pub fn cancel_after(&self, timeout: Duration) -> thread::JoinHandle<()> {
        let token = self.clone();
        let deadline = Instant::now() + timeout;
        thread::spawn(move || {
            while !token.is_cancelled() {
                let now = Instant::now();
                if now >= deadline {
                    log::debug!("timeout of {:?} reached, cancelling", timeout);
                    token.cancel();
                    break;
                }
                thread::sleep(WATCH_INTERVAL.min(deadline - now));
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn cancel_after_fires() {
        let token = CancelToken::new();
        token.cancel_after(Duration::from_millis(1)).join().unwrap();
        assert!(token.is_cancelled());
    }

    #[test]
    fn watcher_exits_when_cancelled_early() {
        let token = CancelToken::new();
        let started = Instant::now();
        let watcher = token.cancel_after(Duration::from_secs(60));
        token.cancel();
        watcher.join().unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
