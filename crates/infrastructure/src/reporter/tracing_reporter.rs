use async_trait::async_trait;
use dnsbl_application::ports::Reporter;
use dnsbl_domain::RunSummary;
use tracing::{error, info, warn};

/// `Reporter` adapter that routes every use-case message through
/// `tracing`, the same sink the rest of the pipeline logs to.
pub struct TracingReporter;

impl TracingReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Reporter for TracingReporter {
    async fn info(&self, message: &str) {
        info!("{message}");
    }

    async fn warn(&self, message: &str) {
        warn!("{message}");
    }

    async fn error(&self, message: &str) {
        error!("{message}");
    }

    async fn summary(&self, summary: &RunSummary) {
        info!("{}", summary.to_line());
    }
}
