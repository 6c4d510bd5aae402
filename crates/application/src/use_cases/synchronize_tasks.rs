use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use dnsbl_domain::{DomainError, QueueMessage, Task, TaskSeed};

use crate::ports::{Reporter, TaskLedger, WorkQueue};

/// C5: reconciles the Generator's output, the Ledger, and the Queue
/// for `today`, per the 7-step synchronization protocol.
pub struct SynchronizeTasksUseCase {
    ledger: Arc<dyn TaskLedger>,
    queue: Arc<dyn WorkQueue>,
    reporter: Arc<dyn Reporter>,
    publish_batch_size: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncReport {
    pub inserted: u64,
    pub published: u64,
}

impl SynchronizeTasksUseCase {
    pub fn new(
        ledger: Arc<dyn TaskLedger>,
        queue: Arc<dyn WorkQueue>,
        reporter: Arc<dyn Reporter>,
        publish_batch_size: usize,
    ) -> Self {
        Self { ledger, queue, reporter, publish_batch_size }
    }

    pub async fn execute(
        &self,
        today: NaiveDate,
        seeds: &[TaskSeed],
    ) -> Result<SyncReport, DomainError> {
        // Step 3: L = existing keys for today (every status).
        let existing = self.ledger.tasks_for_date(today).await?;
        let existing_keys: HashSet<(std::net::Ipv4Addr, String)> =
            existing.iter().map(Task::key).collect();

        // Step 4: T \ L, inserted idempotently.
        let missing: Vec<TaskSeed> = seeds
            .iter()
            .filter(|seed| !existing_keys.contains(seed))
            .cloned()
            .collect();
        let inserted = self.ledger.insert_pending(&missing, today).await?;

        // Step 5: purge the queue outright — the Ledger is authoritative.
        self.queue.purge().await?;

        // Step 6: republish the pending subset in batches.
        let pending = self.ledger.pending_tasks(today).await?;
        let mut published = 0u64;
        for chunk in pending.chunks(self.publish_batch_size) {
            let messages: Vec<QueueMessage> = chunk
                .iter()
                .map(|task| QueueMessage::new(task.ip, task.dns.clone()))
                .collect();
            self.queue.publish(&messages).await?;
            published += messages.len() as u64;
        }

        // Step 7: verify the post-condition, non-fatally.
        let broker_count = self.queue.message_count().await?;
        if broker_count != pending.len() as u64 {
            self.reporter
                .warn(&format!(
                    "queue depth mismatch after sync: expected {}, broker reports {}",
                    pending.len(),
                    broker_count
                ))
                .await;
        }

        Ok(SyncReport { inserted, published })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::Delivery;
    use async_trait::async_trait;
    use dnsbl_domain::{RunSummary, TaskStatus, TaskUpdate};
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct MockLedger {
        rows: StdMutex<Vec<Task>>,
    }

    #[async_trait]
    impl TaskLedger for MockLedger {
        async fn initialize(&self) -> Result<(), DomainError> {
            Ok(())
        }

        async fn insert_pending(
            &self,
            seeds: &[TaskSeed],
            check_date: NaiveDate,
        ) -> Result<u64, DomainError> {
            let mut rows = self.rows.lock().unwrap();
            let existing: HashSet<_> = rows.iter().map(Task::key).collect();
            let mut inserted = 0;
            for (ip, dns) in seeds {
                if !existing.contains(&(*ip, dns.clone())) {
                    rows.push(Task::pending(*ip, dns.clone(), check_date));
                    inserted += 1;
                }
            }
            Ok(inserted)
        }

        async fn tasks_for_date(&self, check_date: NaiveDate) -> Result<Vec<Task>, DomainError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.check_date == check_date)
                .cloned()
                .collect())
        }

        async fn pending_tasks(&self, check_date: NaiveDate) -> Result<Vec<Task>, DomainError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.check_date == check_date && t.status == TaskStatus::Pending)
                .cloned()
                .collect())
        }

        async fn count_pending(&self, check_date: NaiveDate) -> Result<u64, DomainError> {
            Ok(self.pending_tasks(check_date).await?.len() as u64)
        }

        async fn bulk_update(
            &self,
            _updates: &[TaskUpdate],
            _check_date: NaiveDate,
        ) -> Result<(), DomainError> {
            Ok(())
        }

        async fn listed_tasks(&self, _check_date: NaiveDate) -> Result<Vec<Task>, DomainError> {
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

    #[derive(Default)]
    struct MockQueue {
        depth: StdMutex<u64>,
        purge_calls: StdMutex<u32>,
    }

    #[async_trait]
    impl WorkQueue for MockQueue {
        async fn initialize(&self) -> Result<(), DomainError> {
            Ok(())
        }

        async fn publish(&self, messages: &[QueueMessage]) -> Result<(), DomainError> {
            *self.depth.lock().unwrap() += messages.len() as u64;
            Ok(())
        }

        async fn purge(&self) -> Result<u64, DomainError> {
            *self.purge_calls.lock().unwrap() += 1;
            let mut depth = self.depth.lock().unwrap();
            let prior = *depth;
            *depth = 0;
            Ok(prior)
        }

        async fn receive(&self) -> Result<Option<Delivery>, DomainError> {
            Ok(None)
        }

        async fn ack(&self, _tag: u64) -> Result<(), DomainError> {
            Ok(())
        }

        async fn nack(&self, _tag: u64, _requeue: bool) -> Result<(), DomainError> {
            Ok(())
        }

        async fn message_count(&self) -> Result<u64, DomainError> {
            Ok(*self.depth.lock().unwrap())
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
    async fn second_run_inserts_nothing_and_queue_matches_pending() {
        let ledger = Arc::new(MockLedger::default());
        let queue = Arc::new(MockQueue::default());
        let reporter = Arc::new(NoopReporter);
        let use_case = SynchronizeTasksUseCase::new(ledger.clone(), queue.clone(), reporter, 10_000);

        let today = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let seeds = vec![
            ("192.0.2.1".parse().unwrap(), "bl.test".to_string()),
            ("192.0.2.2".parse().unwrap(), "bl.test".to_string()),
        ];

        let first = use_case.execute(today, &seeds).await.unwrap();
        assert_eq!(first.inserted, 2);
        assert_eq!(first.published, 2);

        let second = use_case.execute(today, &seeds).await.unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.published, 2);
    }

    #[tokio::test]
    async fn purges_queue_before_republishing() {
        let ledger = Arc::new(MockLedger::default());
        let queue = Arc::new(MockQueue::default());
        let reporter = Arc::new(NoopReporter);
        let use_case = SynchronizeTasksUseCase::new(ledger, queue.clone(), reporter, 10_000);

        let today = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let seeds = vec![("10.0.0.1".parse().unwrap(), "bl.test".to_string())];

        use_case.execute(today, &seeds).await.unwrap();
        assert_eq!(*queue.purge_calls.lock().unwrap(), 1);
        assert_eq!(use_case.queue.message_count().await.unwrap(), 1);
    }
}
