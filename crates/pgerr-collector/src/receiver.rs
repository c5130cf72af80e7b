//! Bounded input channel between log shippers and the collector.

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::types::LogEntry;

/// Default number of lines buffered before senders wait.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Entry point log shippers forward lines into.
///
/// Holds the sending half for upstream producers and the receiving half
/// until the collector's consumer task claims it. When the buffer is full,
/// `send().await` waits; producers that prefer to drop use `try_send`.
pub struct LogsReceiver {
    tx: mpsc::Sender<LogEntry>,
    rx: Mutex<Option<mpsc::Receiver<LogEntry>>>,
}

impl LogsReceiver {
    /// Create a receiver buffering up to `capacity` lines (at least one).
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
        }
    }

    /// A sender upstream shippers can clone and move into their own tasks.
    pub fn sender(&self) -> mpsc::Sender<LogEntry> {
        self.tx.clone()
    }

    /// Forward one line, waiting for buffer space.
    pub async fn send(&self, entry: LogEntry) -> Result<(), mpsc::error::SendError<LogEntry>> {
        self.tx.send(entry).await
    }

    /// Claim the receiving half. Only the first call gets it.
    pub(crate) fn take(&self) -> Option<mpsc::Receiver<LogEntry>> {
        self.rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Default for LogsReceiver {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lines_arrive_in_order() {
        let receiver = LogsReceiver::new(4);
        let sender = receiver.sender();
        sender.send(LogEntry::new("first")).await.unwrap();
        receiver.send(LogEntry::new("second")).await.unwrap();

        let mut rx = receiver.take().unwrap();
        assert_eq!(rx.recv().await.unwrap().line, "first");
        assert_eq!(rx.recv().await.unwrap().line, "second");
    }

    #[test]
    fn receiving_half_is_taken_once() {
        let receiver = LogsReceiver::default();
        assert!(receiver.take().is_some());
        assert!(receiver.take().is_none());
    }

    #[test]
    fn full_buffer_rejects_try_send() {
        let receiver = LogsReceiver::new(1);
        let sender = receiver.sender();
        sender.try_send(LogEntry::new("a")).unwrap();
        assert!(matches!(
            sender.try_send(LogEntry::new("b")),
            Err(mpsc::error::TrySendError::Full(_))
        ));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let receiver = LogsReceiver::new(0);
        assert!(receiver.sender().try_send(LogEntry::new("a")).is_ok());
    }
}
