use std::net::Ipv4Addr;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dnsbl_application::ports::{TaskLedger, TaskStatusCounts};
use dnsbl_domain::{DomainError, Task, TaskResult, TaskSeed, TaskStatus, TaskUpdate};
use sqlx::SqlitePool;
use tracing::{error, instrument};

type TaskRow = (
    String,
    String,
    String,
    Option<String>,
    String,
    Option<String>,
    Option<String>,
);

/// `TaskLedger` adapter over SQLite, mirroring the schema named in the
/// operation's logical model: one `ip_check` table keyed on
/// `(ip_address, dns, check_date)`.
pub struct SqliteTaskLedger {
    pool: SqlitePool,
}

impl SqliteTaskLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_task(row: TaskRow) -> Result<Task, DomainError> {
        let (ip, dns, status, result, check_date, details, last_updated) = row;

        let ip = Ipv4Addr::from_str(&ip)
            .map_err(|_| DomainError::DatabaseError(format!("corrupt ip in ledger: {ip}")))?;
        let status = TaskStatus::from_str(&status)
            .map_err(|e| DomainError::DatabaseError(format!("corrupt status in ledger: {e}")))?;
        let result = result
            .map(|r| TaskResult::from_str(&r))
            .transpose()
            .map_err(|e| DomainError::DatabaseError(format!("corrupt result in ledger: {e}")))?;
        let check_date = NaiveDate::parse_from_str(&check_date, "%Y-%m-%d").map_err(|e| {
            DomainError::DatabaseError(format!("corrupt check_date in ledger: {e}"))
        })?;
        let last_updated = last_updated
            .map(|s| DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&Utc)))
            .transpose()
            .map_err(|e| {
                DomainError::DatabaseError(format!("corrupt last_updated in ledger: {e}"))
            })?;

        Ok(Task { ip, dns, check_date, status, result, details, last_updated })
    }
}

#[async_trait]
impl TaskLedger for SqliteTaskLedger {
    #[instrument(skip(self))]
    async fn initialize(&self) -> Result<(), DomainError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS ip_check (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ip_address TEXT NOT NULL,
                dns TEXT NOT NULL,
                status TEXT NOT NULL,
                result TEXT,
                check_date TEXT NOT NULL,
                details TEXT,
                last_updated TEXT,
                UNIQUE(ip_address, dns, check_date)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to initialize ledger schema");
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self, seeds))]
    async fn insert_pending(
        &self,
        seeds: &[TaskSeed],
        check_date: NaiveDate,
    ) -> Result<u64, DomainError> {
        if seeds.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!(error = %e, "failed to open transaction for insert_pending");
            DomainError::DatabaseError(e.to_string())
        })?;

        let date_str = check_date.to_string();
        let mut inserted = 0u64;

        for (ip, dns) in seeds {
            let result = sqlx::query(
                "INSERT INTO ip_check (ip_address, dns, status, check_date)
                 VALUES (?, ?, 'pending', ?)
                 ON CONFLICT(ip_address, dns, check_date) DO NOTHING",
            )
            .bind(ip.to_string())
            .bind(dns)
            .bind(&date_str)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to insert pending task");
                DomainError::DatabaseError(e.to_string())
            })?;

            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(|e| {
            error!(error = %e, "failed to commit insert_pending transaction");
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(inserted)
    }

    #[instrument(skip(self))]
    async fn tasks_for_date(&self, check_date: NaiveDate) -> Result<Vec<Task>, DomainError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT ip_address, dns, status, result, check_date, details, last_updated
             FROM ip_check WHERE check_date = ?",
        )
        .bind(check_date.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to fetch tasks for date");
            DomainError::DatabaseError(e.to_string())
        })?;

        rows.into_iter().map(Self::row_to_task).collect()
    }

    #[instrument(skip(self))]
    async fn pending_tasks(&self, check_date: NaiveDate) -> Result<Vec<Task>, DomainError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT ip_address, dns, status, result, check_date, details, last_updated
             FROM ip_check WHERE check_date = ? AND status = 'pending'",
        )
        .bind(check_date.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to fetch pending tasks");
            DomainError::DatabaseError(e.to_string())
        })?;

        rows.into_iter().map(Self::row_to_task).collect()
    }

    #[instrument(skip(self))]
    async fn count_pending(&self, check_date: NaiveDate) -> Result<u64, DomainError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM ip_check WHERE check_date = ? AND status = 'pending'",
        )
        .bind(check_date.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        Ok(count.0 as u64)
    }

    #[instrument(skip(self, updates))]
    async fn bulk_update(
        &self,
        updates: &[TaskUpdate],
        check_date: NaiveDate,
    ) -> Result<(), DomainError> {
        if updates.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!(error = %e, "failed to open transaction for bulk_update");
            DomainError::DatabaseError(e.to_string())
        })?;

        let date_str = check_date.to_string();
        let now = Utc::now().to_rfc3339();

        for update in updates {
            sqlx::query(
                "UPDATE ip_check SET status = ?, result = ?, details = ?, last_updated = ?
                 WHERE ip_address = ? AND dns = ? AND check_date = ?",
            )
            .bind(update.status().as_str())
            .bind(update.result.as_str())
            .bind(&update.details)
            .bind(&now)
            .bind(update.ip.to_string())
            .bind(&update.dns)
            .bind(&date_str)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(error = %e, "bulk_update batch failed, rolling back");
                DomainError::DatabaseError(e.to_string())
            })?;
        }

        tx.commit().await.map_err(|e| {
            error!(error = %e, "failed to commit bulk_update transaction");
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn listed_tasks(&self, check_date: NaiveDate) -> Result<Vec<Task>, DomainError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT ip_address, dns, status, result, check_date, details, last_updated
             FROM ip_check WHERE check_date = ? AND result = 'listed'",
        )
        .bind(check_date.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to fetch listed tasks");
            DomainError::DatabaseError(e.to_string())
        })?;

        rows.into_iter().map(Self::row_to_task).collect()
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self, check_date: NaiveDate) -> Result<TaskStatusCounts, DomainError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM ip_check WHERE check_date = ? GROUP BY status",
        )
        .bind(check_date.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        let mut counts = TaskStatusCounts::default();
        for (status, count) in rows {
            match status.as_str() {
                "pending" => counts.pending = count as u64,
                "completed" => counts.completed = count as u64,
                "failed" => counts.failed = count as u64,
                _ => {}
            }
        }
        Ok(counts)
    }

    #[instrument(skip(self))]
    async fn purge_older_than(
        &self,
        check_date: NaiveDate,
        retention_days: u32,
    ) -> Result<u64, DomainError> {
        if retention_days == 0 {
            return Ok(0);
        }

        let cutoff = check_date - chrono::Duration::days(retention_days as i64 - 1);
        let result = sqlx::query("DELETE FROM ip_check WHERE check_date < ?")
            .bind(cutoff.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to purge stale ledger rows");
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn in_memory_ledger() -> SqliteTaskLedger {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let ledger = SqliteTaskLedger::new(pool);
        ledger.initialize().await.unwrap();
        ledger
    }

    #[tokio::test]
    async fn insert_pending_is_idempotent() {
        let ledger = in_memory_ledger().await;
        let today = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let seeds = vec![("192.0.2.1".parse().unwrap(), "bl.test".to_string())];

        let first = ledger.insert_pending(&seeds, today).await.unwrap();
        let second = ledger.insert_pending(&seeds, today).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 0);
    }

    #[tokio::test]
    async fn bulk_update_transitions_status_and_result() {
        let ledger = in_memory_ledger().await;
        let today = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let ip: Ipv4Addr = "192.0.2.1".parse().unwrap();
        ledger.insert_pending(&[(ip, "bl.test".to_string())], today).await.unwrap();

        let updates = vec![TaskUpdate {
            ip,
            dns: "bl.test".to_string(),
            result: TaskResult::Listed,
            details: Some("127.0.0.2".to_string()),
        }];
        ledger.bulk_update(&updates, today).await.unwrap();

        let listed = ledger.listed_tasks(today).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn purge_older_than_keeps_todays_partition() {
        let ledger = in_memory_ledger().await;
        let today = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let yesterday = today - chrono::Duration::days(1);
        let ip: Ipv4Addr = "192.0.2.1".parse().unwrap();

        ledger.insert_pending(&[(ip, "bl.test".to_string())], today).await.unwrap();
        ledger.insert_pending(&[(ip, "bl.test".to_string())], yesterday).await.unwrap();

        let deleted = ledger.purge_older_than(today, 1).await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(ledger.tasks_for_date(today).await.unwrap().len(), 1);
        assert_eq!(ledger.tasks_for_date(yesterday).await.unwrap().len(), 0);
    }
}
