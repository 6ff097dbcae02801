//! Bounded analysis queue and the worker pool that drains it.
//!
//! The queue carries bare file ids and holds each id at most once: an id
//! is "in flight" from enqueue until its job finishes, and re-submissions
//! inside that window are skipped, so two workers never analyze the same
//! file concurrently. A full queue sheds load: `enqueue` logs and reports
//! the drop, but submission still succeeds — the file stays `pending`
//! until re-triggered.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::PipelineError;

/// Ids currently queued or being processed.
type InFlightSet = Arc<StdMutex<HashSet<Uuid>>>;

// ---------------------------------------------------------------------------
// AnalysisQueue
// ---------------------------------------------------------------------------

/// Sender half of the bounded job channel. Cheap to clone.
#[derive(Clone)]
pub struct AnalysisQueue {
    tx: mpsc::Sender<Uuid>,
    in_flight: InFlightSet,
}

impl AnalysisQueue {
    /// Create the queue with the given capacity, returning the shared
    /// receiver for `WorkerPool::spawn`.
    pub fn new(capacity: usize) -> (Self, QueueReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        let in_flight: InFlightSet = Arc::new(StdMutex::new(HashSet::new()));
        let receiver = QueueReceiver {
            rx: Arc::new(Mutex::new(rx)),
            in_flight: Arc::clone(&in_flight),
        };
        (Self { tx, in_flight }, receiver)
    }

    /// Enqueue a file for analysis. Returns `false` when the id is already
    /// queued or mid-analysis, or when the queue is full — the job is
    /// dropped, never blocked on.
    pub fn enqueue(&self, file_id: Uuid) -> bool {
        if !self.in_flight.lock().unwrap().insert(file_id) {
            debug!(file_id = %file_id, "analysis already queued or running, skipping");
            return false;
        }
        match self.tx.try_send(file_id) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.in_flight.lock().unwrap().remove(&file_id);
                warn!(file_id = %file_id, "analysis queue full, dropping job");
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.in_flight.lock().unwrap().remove(&file_id);
                warn!(file_id = %file_id, "analysis queue closed, dropping job");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// QueueReceiver
// ---------------------------------------------------------------------------

/// Receiver half shared by the pool's workers, paired with the in-flight
/// set so finished ids become enqueueable again.
#[derive(Clone)]
pub struct QueueReceiver {
    rx: Arc<Mutex<mpsc::Receiver<Uuid>>>,
    in_flight: InFlightSet,
}

impl QueueReceiver {
    /// Next file id, or `None` once cancelled or every sender is gone.
    /// Holds the receiver lock only while waiting, so the other workers
    /// can pull jobs while this one processes.
    async fn next(&self, token: &CancellationToken) -> Option<Uuid> {
        let mut rx = self.rx.lock().await;
        tokio::select! {
            _ = token.cancelled() => None,
            id = rx.recv() => id,
        }
    }

    /// Non-blocking receive. `None` when the queue is empty or a worker
    /// holds the receiver.
    pub fn try_next(&self) -> Option<Uuid> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }

    /// Release a finished id so the file can be enqueued again.
    pub fn finish(&self, file_id: Uuid) {
        self.in_flight.lock().unwrap().remove(&file_id);
    }
}

// ---------------------------------------------------------------------------
// JobProcessor
// ---------------------------------------------------------------------------

/// One analysis job, end to end.
#[async_trait]
pub trait JobProcessor: Send + Sync + 'static {
    async fn process(&self, file_id: Uuid) -> Result<(), PipelineError>;

    /// Called after `process` exceeded its wall-clock budget, so the file
    /// can be moved to a terminal status instead of sitting in `analyzing`
    /// forever.
    async fn on_timeout(&self, file_id: Uuid);
}

// ---------------------------------------------------------------------------
// WorkerPool
// ---------------------------------------------------------------------------

/// N worker loops sharing the queue receiver.
pub struct WorkerPool {
    token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `worker_count` loops. Each loop pulls the next file id,
    /// releases the receiver lock, and runs the processor under
    /// `job_timeout`. Per-job failures are logged and the loop continues.
    pub fn spawn(
        receiver: QueueReceiver,
        processor: Arc<dyn JobProcessor>,
        worker_count: usize,
        job_timeout: Duration,
    ) -> Self {
        let token = CancellationToken::new();
        let handles = (0..worker_count)
            .map(|worker| {
                let receiver = receiver.clone();
                let processor = Arc::clone(&processor);
                let token = token.clone();
                tokio::spawn(async move {
                    worker_loop(worker, receiver, processor, token, job_timeout).await;
                })
            })
            .collect();
        Self { token, handles }
    }

    /// Stop accepting work and wait for every worker. A worker mid-job
    /// finishes that job before exiting.
    pub async fn shutdown(self) {
        self.token.cancel();
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "worker task panicked during shutdown");
            }
        }
        info!("worker pool stopped");
    }
}

async fn worker_loop(
    worker: usize,
    receiver: QueueReceiver,
    processor: Arc<dyn JobProcessor>,
    token: CancellationToken,
    job_timeout: Duration,
) {
    debug!(worker, "analysis worker started");
    while let Some(file_id) = receiver.next(&token).await {
        match tokio::time::timeout(job_timeout, processor.process(file_id)).await {
            Ok(Ok(())) => {
                debug!(worker, file_id = %file_id, "analysis job finished");
            }
            Ok(Err(e)) => {
                error!(worker, file_id = %file_id, error = %e, "analysis job failed");
            }
            Err(_) => {
                warn!(worker, file_id = %file_id, timeout_secs = job_timeout.as_secs(),
                    "analysis job timed out");
                processor.on_timeout(file_id).await;
            }
        }
        receiver.finish(file_id);
    }
    debug!(worker, "analysis worker stopped");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
