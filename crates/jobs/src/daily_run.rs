use std::sync::Arc;

use chrono::NaiveDate;
use dnsbl_application::ports::{AnalyticStore, DnsblProber, PrefixSource, Reporter, TaskLedger, WorkQueue};
use dnsbl_application::use_cases::{
    GenerateTasksUseCase, PromoteListedTasksUseCase, SynchronizeTasksUseCase, WorkerPoolUseCase,
};
use dnsbl_domain::{DomainError, RunSummary};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::worker_pool_driver::WorkerPoolDriver;

/// Orchestrates one full idempotent run: Generate -> Synchronize ->
/// Worker Pool -> Promote, in that order, for a single `check_date`.
/// Re-running it for the same date is always safe (I1-I3).
pub struct DailyRunJob {
    ledger: Arc<dyn TaskLedger>,
    queue: Arc<dyn WorkQueue>,
    analytic_store: Arc<dyn AnalyticStore>,
    prober: Arc<dyn DnsblProber>,
    prefix_source: Arc<dyn PrefixSource>,
    reporter: Arc<dyn Reporter>,
    zones: Vec<dnsbl_domain::Zone>,
    publish_batch_size: usize,
    bulk_update_count: usize,
    probe_timeout: std::time::Duration,
    concurrency: usize,
    retention_days: u32,
    shutdown: CancellationToken,
}

pub struct DailyRunJobConfig {
    pub zones: Vec<dnsbl_domain::Zone>,
    pub publish_batch_size: usize,
    pub bulk_update_count: usize,
    pub probe_timeout: std::time::Duration,
    pub concurrency: usize,
    pub retention_days: u32,
}

impl DailyRunJob {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ledger: Arc<dyn TaskLedger>,
        queue: Arc<dyn WorkQueue>,
        analytic_store: Arc<dyn AnalyticStore>,
        prober: Arc<dyn DnsblProber>,
        prefix_source: Arc<dyn PrefixSource>,
        reporter: Arc<dyn Reporter>,
        config: DailyRunJobConfig,
    ) -> Self {
        Self {
            ledger,
            queue,
            analytic_store,
            prober,
            prefix_source,
            reporter,
            zones: config.zones,
            publish_batch_size: config.publish_batch_size,
            bulk_update_count: config.bulk_update_count,
            probe_timeout: config.probe_timeout,
            concurrency: config.concurrency,
            retention_days: config.retention_days,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn run(&self, today: NaiveDate) -> Result<RunSummary, DomainError> {
        info!(check_date = %today, "starting daily run");

        self.ledger.initialize().await?;
        self.queue.initialize().await?;
        self.analytic_store.initialize().await?;

        if self.retention_days > 0 {
            let purged = self.ledger.purge_older_than(today, self.retention_days).await?;
            if purged > 0 {
                info!(purged, "purged stale ledger rows older than retention window");
            }
        }

        let generator = GenerateTasksUseCase::new(Arc::clone(&self.prefix_source), self.zones.clone());
        let generated = generator.execute().await?;
        if generated.skipped_prefixes > 0 {
            self.reporter
                .warn(&format!("skipped {} invalid prefixes during generation", generated.skipped_prefixes))
                .await;
        }

        let synchronizer = SynchronizeTasksUseCase::new(
            Arc::clone(&self.ledger),
            Arc::clone(&self.queue),
            Arc::clone(&self.reporter),
            self.publish_batch_size,
        );
        let sync_report = synchronizer.execute(today, &generated.seeds).await?;

        let worker_use_case = Arc::new(WorkerPoolUseCase::new(
            Arc::clone(&self.ledger),
            Arc::clone(&self.prober),
            Arc::clone(&self.reporter),
            self.probe_timeout,
            self.bulk_update_count,
        ));
        let driver = WorkerPoolDriver::new(worker_use_case, Arc::clone(&self.queue), self.concurrency)
            .with_cancellation(self.shutdown.clone());
        driver.run(today).await?;

        let promoter =
            PromoteListedTasksUseCase::new(Arc::clone(&self.ledger), Arc::clone(&self.analytic_store), Arc::clone(&self.reporter));
        let promoted = promoter.execute(today).await?;

        let counts = self.ledger.count_by_status(today).await?;
        let listed = self.ledger.listed_tasks(today).await?.len();

        let summary = RunSummary {
            check_date: today,
            generated: generated.seeds.len(),
            queued: sync_report.published as usize,
            completed: counts.completed as usize,
            failed: counts.failed as usize,
            listed,
            promoted,
        };

        self.reporter.summary(&summary).await;
        Ok(summary)
    }
}
