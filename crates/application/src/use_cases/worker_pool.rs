use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use dnsbl_domain::{DomainError, TaskResult, TaskUpdate};
use tokio::sync::Mutex;

use crate::ports::{DnsblProber, ProbeOutcome, Reporter, TaskLedger};

/// The shared "to-update" buffer (§4.6 step 3-5). Guarded by a single
/// async mutex; the critical section never spans an `.await` on the
/// Ledger itself — only the `Vec` mutation.
pub struct UpdateBuffer {
    entries: Mutex<Vec<TaskUpdate>>,
    threshold: usize,
}

impl UpdateBuffer {
    pub fn new(threshold: usize) -> Self {
        Self { entries: Mutex::new(Vec::new()), threshold }
    }

    /// Appends `update`; if the buffer has reached `threshold`, drains
    /// and returns the batch so the caller can hand it to the Ledger
    /// outside the lock. Only one caller ever observes `Some` for a
    /// given threshold crossing (the drain happens inside the lock).
    pub async fn push(&self, update: TaskUpdate) -> Option<Vec<TaskUpdate>> {
        let mut guard = self.entries.lock().await;
        guard.push(update);
        if guard.len() >= self.threshold {
            Some(guard.drain(..).collect())
        } else {
            None
        }
    }

    /// Final drain on shutdown: empties whatever remains, regardless
    /// of threshold.
    pub async fn drain_all(&self) -> Vec<TaskUpdate> {
        let mut guard = self.entries.lock().await;
        guard.drain(..).collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

/// C6's per-task algorithm: probe, classify, and batch-flush to the
/// Ledger. The concurrent driver (N tokio tasks, cancellation,
/// termination counting) lives in `dnsbl-jobs`; this use case is the
/// sequential core each worker task calls into.
pub struct WorkerPoolUseCase {
    ledger: Arc<dyn TaskLedger>,
    prober: Arc<dyn DnsblProber>,
    reporter: Arc<dyn Reporter>,
    probe_timeout: Duration,
    bulk_update_count: usize,
}

impl WorkerPoolUseCase {
    pub fn new(
        ledger: Arc<dyn TaskLedger>,
        prober: Arc<dyn DnsblProber>,
        reporter: Arc<dyn Reporter>,
        probe_timeout: Duration,
        bulk_update_count: usize,
    ) -> Self {
        Self { ledger, prober, reporter, probe_timeout, bulk_update_count }
    }

    pub fn bulk_update_count(&self) -> usize {
        self.bulk_update_count
    }

    pub fn new_buffer(&self) -> UpdateBuffer {
        UpdateBuffer::new(self.bulk_update_count)
    }

    /// Step 1-2: invoke the Prober under the per-probe deadline. A
    /// timeout or any Prober-internal failure is always encoded as a
    /// terminal `TaskUpdate`, never propagated — the pool never sees a
    /// probe error, only probe results.
    pub async fn probe(&self, ip: Ipv4Addr, dns: String) -> TaskUpdate {
        let outcome = match tokio::time::timeout(self.probe_timeout, self.prober.probe(ip, &dns)).await
        {
            Ok(outcome) => outcome,
            Err(_) => ProbeOutcome::new(TaskResult::TimedOut, Some("timed out".to_string())),
        };

        TaskUpdate { ip, dns, result: outcome.result, details: outcome.details }
    }

    /// Step 5: hands a full batch to the Ledger. On failure the batch
    /// is NOT re-buffered here (the keep-in-buffer policy is the
    /// caller's responsibility, since only the caller knows whether a
    /// retry attempt is appropriate) — the error is reported and
    /// returned so the driver can decide.
    pub async fn flush(&self, updates: Vec<TaskUpdate>, today: NaiveDate) -> Result<(), DomainError> {
        if updates.is_empty() {
            return Ok(());
        }
        match self.ledger.bulk_update(&updates, today).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.reporter
                    .error(&format!("bulk update of {} tasks failed: {err}", updates.len()))
                    .await;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dnsbl_domain::{RunSummary, TaskSeed};
    use std::sync::Mutex as StdMutex;

    struct SlowProber(Duration);

    #[async_trait]
    impl DnsblProber for SlowProber {
        async fn probe(&self, _ip: Ipv4Addr, _zone_dns: &str) -> ProbeOutcome {
            tokio::time::sleep(self.0).await;
            ProbeOutcome::new(TaskResult::NotListed, None)
        }
    }

    struct FixedProber(TaskResult);

    #[async_trait]
    impl DnsblProber for FixedProber {
        async fn probe(&self, _ip: Ipv4Addr, _zone_dns: &str) -> ProbeOutcome {
            ProbeOutcome::new(self.0, None)
        }
    }

    #[derive(Default)]
    struct RecordingLedger {
        flushed: StdMutex<Vec<TaskUpdate>>,
        fail_next: StdMutex<bool>,
    }

    #[async_trait]
    impl TaskLedger for RecordingLedger {
        async fn initialize(&self) -> Result<(), DomainError> {
            Ok(())
        }
        async fn insert_pending(
            &self,
            _seeds: &[TaskSeed],
            _check_date: NaiveDate,
        ) -> Result<u64, DomainError> {
            Ok(0)
        }
        async fn tasks_for_date(
            &self,
            _check_date: NaiveDate,
        ) -> Result<Vec<dnsbl_domain::Task>, DomainError> {
            Ok(vec![])
        }
        async fn pending_tasks(
            &self,
            _check_date: NaiveDate,
        ) -> Result<Vec<dnsbl_domain::Task>, DomainError> {
            Ok(vec![])
        }
        async fn count_pending(&self, _check_date: NaiveDate) -> Result<u64, DomainError> {
            Ok(0)
        }
        async fn bulk_update(
            &self,
            updates: &[TaskUpdate],
            _check_date: NaiveDate,
        ) -> Result<(), DomainError> {
            if *self.fail_next.lock().unwrap() {
                return Err(DomainError::DatabaseError("simulated failure".to_string()));
            }
            self.flushed.lock().unwrap().extend_from_slice(updates);
            Ok(())
        }
        async fn listed_tasks(
            &self,
            _check_date: NaiveDate,
        ) -> Result<Vec<dnsbl_domain::Task>, DomainError> {
            Ok(vec![])
        }
        async fn count_by_status(
            &self,
            _check_date: NaiveDate,
        ) -> Result<crate::ports::TaskStatusCounts, DomainError> {
            Ok(Default::default())
        }
        async fn purge_older_than(
            &self,
            _check_date: NaiveDate,
            _retention_days: u32,
        ) -> Result<u64, DomainError> {
            Ok(0)
        }
    }

    struct NoopReporter;
    #[async_trait]
    impl Reporter for NoopReporter {
        async fn info(&self, _message: &str) {}
        async fn warn(&self, _message: &str) {}
        async fn error(&self, _message: &str) {}
        async fn summary(&self, _summary: &RunSummary) {}
    }

    #[tokio::test]
    async fn slow_probe_times_out() {
        let use_case = WorkerPoolUseCase::new(
            Arc::new(RecordingLedger::default()),
            Arc::new(SlowProber(Duration::from_millis(50))),
            Arc::new(NoopReporter),
            Duration::from_millis(5),
            500,
        );

        let update = use_case.probe("10.0.0.1".parse().unwrap(), "bl.test".to_string()).await;
        assert_eq!(update.result, TaskResult::TimedOut);
        assert_eq!(update.details.as_deref(), Some("timed out"));
    }

    #[tokio::test]
    async fn fast_probe_returns_actual_result() {
        let use_case = WorkerPoolUseCase::new(
            Arc::new(RecordingLedger::default()),
            Arc::new(FixedProber(TaskResult::Listed)),
            Arc::new(NoopReporter),
            Duration::from_secs(60),
            500,
        );

        let update = use_case.probe("10.0.0.1".parse().unwrap(), "bl.test".to_string()).await;
        assert_eq!(update.result, TaskResult::Listed);
    }

    #[tokio::test]
    async fn buffer_drains_exactly_at_threshold() {
        let buffer = UpdateBuffer::new(2);
        let update = |n: u8| TaskUpdate {
            ip: format!("10.0.0.{n}").parse().unwrap(),
            dns: "bl.test".to_string(),
            result: TaskResult::NotListed,
            details: None,
        };

        assert!(buffer.push(update(1)).await.is_none());
        let drained = buffer.push(update(2)).await;
        assert_eq!(drained.unwrap().len(), 2);
        assert_eq!(buffer.len().await, 0);
    }

    #[tokio::test]
    async fn drain_all_empties_a_partial_buffer() {
        let buffer = UpdateBuffer::new(500);
        let update = TaskUpdate {
            ip: "10.0.0.1".parse().unwrap(),
            dns: "bl.test".to_string(),
            result: TaskResult::NotListed,
            details: None,
        };
        assert!(buffer.push(update).await.is_none());

        let remaining = buffer.drain_all().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(buffer.len().await, 0);
    }
}
