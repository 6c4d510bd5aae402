use async_trait::async_trait;
use dnsbl_application::ports::AnalyticStore;
use dnsbl_domain::{AnalyticRow, DomainError};
use tracing::warn;

/// `AnalyticStore` used when no Postgres connection is configured
/// (`PostgresConfig::is_configured()` is false). The Promoter still
/// runs; it just has nowhere to write, so it logs and drops the rows.
pub struct NoopAnalyticStore;

#[async_trait]
impl AnalyticStore for NoopAnalyticStore {
    async fn initialize(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn upsert_many(&self, rows: &[AnalyticRow]) -> Result<u64, DomainError> {
        if !rows.is_empty() {
            warn!(count = rows.len(), "analytic store not configured, dropping listed rows");
        }
        Ok(0)
    }
}
