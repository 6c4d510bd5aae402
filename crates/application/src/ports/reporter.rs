use async_trait::async_trait;
use dnsbl_domain::RunSummary;

/// The capability every use case logs and reports through (§9's design
/// note: "never calls the terminal renderer directly").
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn info(&self, message: &str);
    async fn warn(&self, message: &str);
    async fn error(&self, message: &str);
    async fn summary(&self, summary: &RunSummary);
}
