//! Change notifications and the channel that carries them.
//!
//! Emission never blocks the watch callback. The channel is bounded; when it
//! is full the newest event is dropped and counted.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Semaphore, mpsc};
use tokio::sync::mpsc::error::TrySendError;

/// An accepted change for one function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub function_name: String,
    /// Watched directory, absolute.
    pub local_path: PathBuf,
    /// The file that changed, absolute.
    pub changed_file: PathBuf,
    pub handler: String,
    pub runtime: String,
    pub timestamp: DateTime<Utc>,
}

/// Receiving half handed to the reload collaborator.
pub type ChangeReceiver = mpsc::Receiver<ChangeEvent>;

/// Sending half shared by every watched directory.
#[derive(Debug, Clone)]
pub struct ChangeSink {
    sender: mpsc::Sender<ChangeEvent>,
    dropped: Arc<AtomicU64>,
}

impl ChangeSink {
    /// Create a sink with room for `capacity` undelivered events.
    ///
    /// The capacity is clamped to what a tokio channel can hold.
    pub fn channel(capacity: usize) -> (Self, ChangeReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.clamp(1, Semaphore::MAX_PERMITS));
        let sink = Self {
            sender,
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (sink, receiver)
    }

    /// Queue an event without waiting. Returns whether it was queued.
    pub fn emit(&self, event: ChangeEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(
                    "[watcher] event queue full, dropped change for {} ({total} dropped so far)",
                    event.function_name
                );
                false
            }
            Err(TrySendError::Closed(event)) => {
                crate::debug_event!(
                    "watcher",
                    "dropped",
                    "no receiver for {}",
                    event.function_name
                );
                false
            }
        }
    }

    /// Events dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str) -> ChangeEvent {
        ChangeEvent {
            function_name: name.to_string(),
            local_path: PathBuf::from("/w/fn"),
            changed_file: PathBuf::from("/w/fn/app.py"),
            handler: "app.handler".to_string(),
            runtime: "python3.12".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_emit_delivers() {
        let (sink, mut rx) = ChangeSink::channel(4);
        assert!(sink.emit(event("a")));
        let received = rx.recv().await.unwrap();
        assert_eq!(received.function_name, "a");
    }

    #[test]
    fn test_full_queue_drops_newest() {
        let (sink, mut rx) = ChangeSink::channel(1);
        assert!(sink.emit(event("first")));
        assert!(!sink.emit(event("second")));
        assert_eq!(sink.dropped(), 1);

        let kept = rx.try_recv().unwrap();
        assert_eq!(kept.function_name, "first");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_capacity_is_clamped() {
        let (sink, _rx) = ChangeSink::channel(usize::MAX);
        assert!(sink.emit(event("a")));

        let (sink, mut rx) = ChangeSink::channel(0);
        assert!(sink.emit(event("b")));
        assert!(!sink.emit(event("c")));
        assert_eq!(rx.try_recv().unwrap().function_name, "b");
    }

    #[test]
    fn test_closed_receiver_is_not_counted() {
        let (sink, rx) = ChangeSink::channel(1);
        drop(rx);
        assert!(!sink.emit(event("a")));
        assert_eq!(sink.dropped(), 0);
    }

    #[test]
    fn test_event_serializes_as_json() {
        let json = serde_json::to_value(event("orders")).unwrap();
        assert_eq!(json["function_name"], "orders");
        assert_eq!(json["changed_file"], "/w/fn/app.py");
        assert!(json["timestamp"].is_string());
    }
}
