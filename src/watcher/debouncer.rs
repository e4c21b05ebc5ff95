//! Per-directory debouncing of accepted changes.
//!
//! Editors and build tools write several files in quick succession. Each
//! watched directory keeps the instant of its last accepted change; anything
//! arriving within the interval after it is suppressed. The window is per
//! directory, not per file.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Debounce state for one watched directory.
#[derive(Debug)]
pub struct PathDebouncer {
    interval: Duration,
    last_accepted: Mutex<Instant>,
}

impl PathDebouncer {
    /// Create a debouncer whose window starts now.
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    /// Create a debouncer whose window starts at `start`.
    pub fn starting_at(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            last_accepted: Mutex::new(start),
        }
    }

    /// Accept or suppress a change observed at `now`.
    ///
    /// The compare and the update happen under one lock, so two callbacks
    /// racing on the same directory cannot both be accepted.
    pub fn try_accept_at(&self, now: Instant) -> bool {
        let mut last = self.last_accepted.lock();
        if now.saturating_duration_since(*last) < self.interval {
            return false;
        }
        *last = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const INTERVAL: Duration = Duration::from_millis(700);

    #[test]
    fn test_suppresses_within_interval_of_start() {
        let start = Instant::now();
        let debouncer = PathDebouncer::starting_at(INTERVAL, start);

        assert!(!debouncer.try_accept_at(start + Duration::from_millis(100)));
        assert!(debouncer.try_accept_at(start + INTERVAL));
    }

    #[test]
    fn test_burst_collapses_to_one() {
        let start = Instant::now();
        let debouncer = PathDebouncer::starting_at(INTERVAL, start);
        let burst_start = start + Duration::from_secs(5);

        let accepted = (0..20)
            .filter(|i| debouncer.try_accept_at(burst_start + Duration::from_millis(i * 10)))
            .count();
        assert_eq!(accepted, 1);
        // The window is measured from the first change of the burst
        assert!(!debouncer.try_accept_at(burst_start + INTERVAL - Duration::from_millis(1)));
        assert!(debouncer.try_accept_at(burst_start + INTERVAL + Duration::from_millis(1)));
    }

    #[test]
    fn test_suppressed_events_do_not_extend_window() {
        let start = Instant::now();
        let debouncer = PathDebouncer::starting_at(INTERVAL, start);
        let t0 = start + Duration::from_secs(1);

        assert!(debouncer.try_accept_at(t0));
        assert!(!debouncer.try_accept_at(t0 + Duration::from_millis(600)));
        // Measured from the last accepted change, not the last suppressed one
        assert!(debouncer.try_accept_at(t0 + Duration::from_millis(700)));
    }

    #[test]
    fn test_concurrent_callers_accept_once() {
        let start = Instant::now();
        let debouncer = Arc::new(PathDebouncer::starting_at(Duration::from_secs(60), start));
        let observed = start + Duration::from_secs(61);
        let accepted = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let debouncer = Arc::clone(&debouncer);
                let accepted = Arc::clone(&accepted);
                std::thread::spawn(move || {
                    if debouncer.try_accept_at(observed) {
                        accepted.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }
}
