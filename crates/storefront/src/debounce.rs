//! Trailing-edge debouncer.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Emits only the last value pushed within a quiet period.
///
/// Every push restarts the timer. Dropping the debouncer cancels a pending
/// emission.
#[derive(Debug)]
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn a debouncer that calls `on_settle` once `delay` has passed
    /// without a new value.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new<F>(delay: Duration, mut on_settle: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        let task = tokio::spawn(async move {
            while let Some(mut pending) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => pending = value,
                            None => return,
                        },
                        () = tokio::time::sleep(delay) => {
                            on_settle(pending);
                            break;
                        }
                    }
                }
            }
        });

        Self { tx, task }
    }

    /// Push a new value, restarting the quiet period.
    pub fn push(&self, value: T) {
        // The receiver lives as long as the task, which lives as long as self.
        let _ = self.tx.send(value);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl FnMut(String) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |value| sink.lock().unwrap().push(value))
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_final_value_is_emitted() {
        let (seen, sink) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(300), sink);

        for text in ["l", "la", "lam", "lamp"] {
            debouncer.push(text.to_owned());
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(seen.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(*seen.lock().unwrap(), vec!["lamp".to_owned()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_emit_separately() {
        let (seen, sink) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(300), sink);

        debouncer.push("a".to_owned());
        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.push("b".to_owned());
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(*seen.lock().unwrap(), vec!["a".to_owned(), "b".to_owned()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_value() {
        let (seen, sink) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(300), sink);

        debouncer.push("gone".to_owned());
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(debouncer);
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(seen.lock().unwrap().is_empty());
    }
}
