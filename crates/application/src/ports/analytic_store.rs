use async_trait::async_trait;
use dnsbl_domain::{AnalyticRow, DomainError};

/// Long-term store of `listed` outcomes (C7's target). Upsert
/// semantics on `(ip_address, dns, check_date)` — promotion can run
/// more than once per day without duplicating rows.
#[async_trait]
pub trait AnalyticStore: Send + Sync {
    async fn initialize(&self) -> Result<(), DomainError>;

    /// Returns the number of rows actually written (inserted or
    /// updated).
    async fn upsert_many(&self, rows: &[AnalyticRow]) -> Result<u64, DomainError>;
}
