use async_trait::async_trait;
use chrono::NaiveDate;
use dnsbl_domain::{DomainError, Task, TaskSeed, TaskUpdate};

/// The authoritative record of every task ever generated (C2). Single
/// writer per run, many readers; see invariants I1-I3.
#[async_trait]
pub trait TaskLedger: Send + Sync {
    async fn initialize(&self) -> Result<(), DomainError>;

    /// Inserts `(ip, dns, check_date)` rows as `pending` if they don't
    /// already exist. Returns the number of rows actually inserted —
    /// callers rely on this to detect a no-op resync.
    async fn insert_pending(
        &self,
        seeds: &[TaskSeed],
        check_date: NaiveDate,
    ) -> Result<u64, DomainError>;

    /// Full row set for `check_date` (all statuses) — the Synchronizer's
    /// set `L` in §4.5 step 3.
    async fn tasks_for_date(&self, check_date: NaiveDate) -> Result<Vec<Task>, DomainError>;

    async fn pending_tasks(&self, check_date: NaiveDate) -> Result<Vec<Task>, DomainError>;

    async fn count_pending(&self, check_date: NaiveDate) -> Result<u64, DomainError>;

    /// Applies a batch of terminal results, transitioning each matched
    /// row from `pending` to `completed` or `failed` (I3: never back).
    async fn bulk_update(
        &self,
        updates: &[TaskUpdate],
        check_date: NaiveDate,
    ) -> Result<(), DomainError>;

    async fn listed_tasks(&self, check_date: NaiveDate) -> Result<Vec<Task>, DomainError>;

    async fn count_by_status(&self, check_date: NaiveDate) -> Result<TaskStatusCounts, DomainError>;

    /// Deletes rows strictly older than `retention_days` before
    /// `check_date`. Supplemental feature; a no-op store may return 0.
    async fn purge_older_than(
        &self,
        check_date: NaiveDate,
        retention_days: u32,
    ) -> Result<u64, DomainError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStatusCounts {
    pub pending: u64,
    pub completed: u64,
    pub failed: u64,
}
