//! QueuedPipe - in-process delivery through a bounded queue and worker task

use std::fmt;
use std::sync::Arc;

use contracts::{DispatchTarget, Payload, Sink};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use crate::metrics::PipeMetrics;

/// Handle to a running pipe worker
///
/// Payloads sent through any [`QueuedSink`] are dispatched on the worker
/// task, in send order.
pub struct QueuedPipe {
    /// Pipe name
    name: String,
    /// Only strong sender; sinks hold weak ones
    tx: mpsc::Sender<Payload>,
    /// Shared metrics
    metrics: Arc<PipeMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl QueuedPipe {
    /// Create a pipe delivering to `target` and spawn its worker task
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn<T>(name: impl Into<String>, target: T, queue_capacity: usize) -> Self
    where
        T: DispatchTarget + 'static,
    {
        let name = name.into();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(PipeMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            pipe_worker(target, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<PipeMetrics> {
        &self.metrics
    }

    /// Sending side, to hand to an emitter
    pub fn sink(&self) -> QueuedSink {
        QueuedSink {
            name: self.name.clone(),
            tx: self.tx.downgrade(),
            metrics: Arc::clone(&self.metrics),
        }
    }

    /// Stop accepting payloads, drain the queue and wait for the worker
    #[instrument(name = "queued_pipe_shutdown", skip(self), fields(pipe = %self.name))]
    pub async fn shutdown(self) {
        // Sinks only hold weak senders, so this closes the channel
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(pipe = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(pipe = %self.name, "QueuedPipe shutdown complete");
    }
}

impl fmt::Debug for QueuedPipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedPipe")
            .field("name", &self.name)
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}

/// Sending side of a [`QueuedPipe`]
///
/// Never blocks: when the queue is full or the pipe is shut down the payload
/// is dropped and counted.
#[derive(Clone)]
pub struct QueuedSink {
    name: String,
    tx: mpsc::WeakSender<Payload>,
    metrics: Arc<PipeMetrics>,
}

impl QueuedSink {
    fn drop_payload(&self, reason: &'static str) {
        self.metrics.inc_dropped();
        observability::record_pipe_dropped(&self.name);
        warn!(pipe = %self.name, reason, "Payload dropped");
    }
}

impl Sink for QueuedSink {
    fn send(&self, payload: Payload) {
        let Some(tx) = self.tx.upgrade() else {
            self.drop_payload("pipe closed");
            return;
        };

        match tx.try_send(payload) {
            Ok(()) => {
                self.metrics
                    .set_queue_len(tx.max_capacity() - tx.capacity());
            }
            Err(mpsc::error::TrySendError::Full(_)) => self.drop_payload("queue full"),
            Err(mpsc::error::TrySendError::Closed(_)) => self.drop_payload("pipe closed"),
        }
    }
}

impl fmt::Debug for QueuedSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedSink").field("name", &self.name).finish()
    }
}

/// Worker task that dispatches queued payloads
#[instrument(
    name = "queued_pipe_worker",
    skip(target, rx, metrics),
    fields(pipe = %name)
)]
async fn pipe_worker<T: DispatchTarget>(
    target: T,
    mut rx: mpsc::Receiver<Payload>,
    metrics: Arc<PipeMetrics>,
    name: String,
) {
    debug!(pipe = %name, "Pipe worker started");

    while let Some(payload) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match target.dispatch(&payload) {
            Ok(true) => metrics.inc_delivered(),
            Ok(false) => {
                metrics.inc_unmatched();
                debug!(
                    pipe = %name,
                    class_name = ?payload.class_name(),
                    "No receiver consumed payload"
                );
            }
            Err(e) => {
                // Keep draining, one malformed payload must not stop the pipe
                metrics.inc_faults();
                warn!(pipe = %name, error = %e, "Dispatch failed");
            }
        }
    }

    debug!(pipe = %name, "Pipe worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{DecodeError, Value, KEY_CLASS_NAME};
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::{sleep, Duration};

    /// Mock target for testing
    struct MockTarget {
        consumed: Arc<AtomicU64>,
        delay_ms: u64,
    }

    impl DispatchTarget for MockTarget {
        fn matches(&self, payload: &Payload) -> bool {
            payload.class_name() == Some("mock")
        }

        fn dispatch(&self, payload: &Payload) -> Result<bool, DecodeError> {
            if self.delay_ms > 0 {
                std::thread::sleep(std::time::Duration::from_millis(self.delay_ms));
            }
            if !self.matches(payload) {
                return Ok(false);
            }
            if payload.contains_key("broken") {
                return Err(DecodeError::missing_key("value"));
            }
            self.consumed.fetch_add(1, Ordering::Relaxed);
            Ok(true)
        }
    }

    fn payload(class_name: &str) -> Payload {
        let mut payload = Payload::new();
        payload.insert(KEY_CLASS_NAME, Value::String(class_name.into()));
        payload
    }

    #[tokio::test]
    async fn test_queued_pipe_basic() {
        let consumed = Arc::new(AtomicU64::new(0));
        let pipe = QueuedPipe::spawn(
            "test",
            MockTarget {
                consumed: Arc::clone(&consumed),
                delay_ms: 0,
            },
            10,
        );

        let sink = pipe.sink();
        for _ in 0..5 {
            sink.send(payload("mock"));
        }
        sink.send(payload("other"));

        let metrics = Arc::clone(pipe.metrics());
        pipe.shutdown().await;

        assert_eq!(consumed.load(Ordering::Relaxed), 5);
        assert_eq!(metrics.delivered(), 5);
        assert_eq!(metrics.unmatched(), 1);
    }

    #[tokio::test]
    async fn test_queued_pipe_queue_full() {
        let pipe = QueuedPipe::spawn(
            "slow",
            MockTarget {
                consumed: Arc::new(AtomicU64::new(0)),
                delay_ms: 50,
            },
            2,
        );

        let sink = pipe.sink();
        for _ in 0..10 {
            sink.send(payload("mock"));
        }

        assert!(pipe.metrics().dropped() > 0);

        pipe.shutdown().await;
    }

    #[tokio::test]
    async fn test_queued_pipe_fault_isolation() {
        let consumed = Arc::new(AtomicU64::new(0));
        let pipe = QueuedPipe::spawn(
            "faulty",
            MockTarget {
                consumed: Arc::clone(&consumed),
                delay_ms: 0,
            },
            10,
        );

        let sink = pipe.sink();
        let mut broken = payload("mock");
        broken.encode("broken", true);
        sink.send(broken);
        sink.send(payload("mock"));

        sleep(Duration::from_millis(50)).await;

        assert_eq!(pipe.metrics().faults(), 1);
        assert_eq!(consumed.load(Ordering::Relaxed), 1);

        pipe.shutdown().await;
    }

    #[tokio::test]
    async fn test_send_after_shutdown_is_dropped() {
        let pipe = QueuedPipe::spawn(
            "closed",
            MockTarget {
                consumed: Arc::new(AtomicU64::new(0)),
                delay_ms: 0,
            },
            4,
        );
        let sink = pipe.sink();
        let metrics = Arc::clone(pipe.metrics());
        pipe.shutdown().await;

        sink.send(payload("mock"));
        assert_eq!(metrics.dropped(), 1);
    }
}
