use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use dnsbl_application::ports::WorkQueue;
use dnsbl_application::use_cases::WorkerPoolUseCase;
use dnsbl_domain::DomainError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Drives C6's state machine (`IDLE -> PROBING -> BUFFERING -> ack ->
/// IDLE`, draining at the buffer threshold or on shutdown) across a
/// bounded pool of concurrent tokio tasks pulling from the Queue. The
/// sequential per-task algorithm is `WorkerPoolUseCase`; this struct
/// owns concurrency and termination.
pub struct WorkerPoolDriver {
    use_case: Arc<WorkerPoolUseCase>,
    queue: Arc<dyn WorkQueue>,
    concurrency: usize,
    shutdown: CancellationToken,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PoolReport {
    pub total_tasks: u64,
    pub probed: u64,
}

impl WorkerPoolDriver {
    pub fn new(use_case: Arc<WorkerPoolUseCase>, queue: Arc<dyn WorkQueue>, concurrency: usize) -> Self {
        Self { use_case, queue, concurrency, shutdown: CancellationToken::new() }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Captures `total_tasks` from the broker's message count at the
    /// start of the drain, then runs `concurrency` workers until
    /// `tasks_done` reaches it — the worker that completes the last
    /// task signals every other worker to stop. A process-level
    /// shutdown signal (own `CancellationToken`) stops every worker
    /// immediately instead.
    pub async fn run(&self, today: NaiveDate) -> Result<PoolReport, DomainError> {
        let total_tasks = self.queue.message_count().await?;
        if total_tasks == 0 {
            info!("worker pool: queue empty, nothing to probe");
            return Ok(PoolReport::default());
        }
        info!(total_tasks, concurrency = self.concurrency, "worker pool: starting drain");

        let tasks_done = Arc::new(AtomicU64::new(0));
        let buffer = Arc::new(self.use_case.new_buffer());
        let stop = self.shutdown.child_token();

        let mut handles = Vec::with_capacity(self.concurrency);
        for worker_id in 0..self.concurrency {
            let use_case = Arc::clone(&self.use_case);
            let queue = Arc::clone(&self.queue);
            let buffer = Arc::clone(&buffer);
            let tasks_done = Arc::clone(&tasks_done);
            let stop = stop.clone();

            handles.push(tokio::spawn(async move {
                run_worker(worker_id, use_case, queue, buffer, tasks_done, total_tasks, stop, today).await
            }));
        }

        for handle in handles {
            if let Err(err) = handle.await {
                error!(error = %err, "worker pool task panicked");
            }
        }

        let remaining = buffer.drain_all().await;
        if !remaining.is_empty() {
            self.use_case.flush(remaining, today).await?;
        }

        Ok(PoolReport { total_tasks, probed: tasks_done.load(Ordering::Relaxed) })
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_worker(
    worker_id: usize,
    use_case: Arc<WorkerPoolUseCase>,
    queue: Arc<dyn WorkQueue>,
    buffer: Arc<dnsbl_application::use_cases::UpdateBuffer>,
    tasks_done: Arc<AtomicU64>,
    total_tasks: u64,
    stop: CancellationToken,
    today: NaiveDate,
) {
    loop {
        if stop.is_cancelled() || tasks_done.load(Ordering::Relaxed) >= total_tasks {
            break;
        }

        let delivery = tokio::select! {
            _ = stop.cancelled() => break,
            result = queue.receive() => result,
        };

        let delivery = match delivery {
            Ok(Some(delivery)) => delivery,
            Ok(None) => {
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
                continue;
            }
            Err(err) => {
                warn!(worker_id, error = %err, "worker pool: queue receive failed, retrying");
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
                continue;
            }
        };

        let update = use_case.probe(delivery.message.ip, delivery.message.dns.clone()).await;

        if let Some(batch) = buffer.push(update).await {
            if let Err(err) = use_case.flush(batch, today).await {
                error!(worker_id, error = %err, "worker pool: batch flush failed, nacking delivery for requeue");
                let _ = queue.nack(delivery.tag, true).await;
                continue;
            }
        }

        if let Err(err) = queue.ack(delivery.tag).await {
            warn!(worker_id, error = %err, "worker pool: ack failed");
        }

        let done = tasks_done.fetch_add(1, Ordering::SeqCst) + 1;
        if done >= total_tasks {
            info!(worker_id, total_tasks, "worker pool: last task completed, signaling stop");
            stop.cancel();
            break;
        }
    }

    info!(worker_id, "worker pool: exited");
}
