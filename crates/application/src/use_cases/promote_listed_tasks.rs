use std::sync::Arc;

use chrono::NaiveDate;
use dnsbl_domain::{AnalyticRow, DomainError};

use crate::ports::{AnalyticStore, Reporter, TaskLedger};

/// C7: copies `listed` Ledger rows for `today` into the analytic
/// store. Runs after the Worker Pool exits normally.
pub struct PromoteListedTasksUseCase {
    ledger: Arc<dyn TaskLedger>,
    analytic_store: Arc<dyn AnalyticStore>,
    reporter: Arc<dyn Reporter>,
}

impl PromoteListedTasksUseCase {
    pub fn new(
        ledger: Arc<dyn TaskLedger>,
        analytic_store: Arc<dyn AnalyticStore>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self { ledger, analytic_store, reporter }
    }

    /// `today` realizes the Promoter's "latest day" clause — see
    /// DESIGN.md's Open Question decision.
    pub async fn execute(&self, today: NaiveDate) -> Result<u64, DomainError> {
        let listed = self.ledger.listed_tasks(today).await?;
        let rows: Vec<AnalyticRow> =
            listed.iter().filter_map(AnalyticRow::from_listed_task).collect();

        if rows.is_empty() {
            return Ok(0);
        }

        match self.analytic_store.upsert_many(&rows).await {
            Ok(promoted) => Ok(promoted),
            Err(_first_err) => {
                // The store reports a missing table the same way a
                // fresh deployment would: create it and retry once.
                self.reporter
                    .warn("analytic store table missing, creating and retrying promotion")
                    .await;
                self.analytic_store.initialize().await?;
                self.analytic_store.upsert_many(&rows).await
            }
        }
    }
}
