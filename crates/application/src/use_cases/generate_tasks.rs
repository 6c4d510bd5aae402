use std::sync::Arc;

use dnsbl_domain::{Prefix, TaskSeed, Zone};
use tracing::warn;

use crate::ports::PrefixSource;

/// C4: expands the configured CIDR prefixes into host-IPs, crossed
/// with the configured zone set, into a flat sequence of task seeds.
pub struct GenerateTasksUseCase {
    prefix_source: Arc<dyn PrefixSource>,
    zones: Vec<Zone>,
}

#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub seeds: Vec<TaskSeed>,
    pub skipped_prefixes: usize,
}

impl GenerateTasksUseCase {
    pub fn new(prefix_source: Arc<dyn PrefixSource>, zones: Vec<Zone>) -> Self {
        Self { prefix_source, zones }
    }

    pub async fn execute(&self) -> Result<GenerateReport, dnsbl_domain::DomainError> {
        let raw_prefixes = self.prefix_source.load().await?;

        let mut seeds = Vec::new();
        let mut skipped_prefixes = 0;

        // Deterministic order: prefixes as read, zones as configured.
        for raw in &raw_prefixes {
            let prefix = match Prefix::parse(raw) {
                Ok(p) => p,
                Err(err) => {
                    warn!(prefix = %raw, error = %err, "skipping invalid CIDR prefix");
                    skipped_prefixes += 1;
                    continue;
                }
            };

            for host in prefix.hosts() {
                for zone in &self.zones {
                    seeds.push((host, zone.dns.clone()));
                }
            }
        }

        Ok(GenerateReport { seeds, skipped_prefixes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedPrefixSource(Vec<String>);

    #[async_trait]
    impl PrefixSource for FixedPrefixSource {
        async fn load(&self) -> Result<Vec<String>, dnsbl_domain::DomainError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn cross_products_hosts_and_zones() {
        let source = Arc::new(FixedPrefixSource(vec!["192.0.2.0/30".to_string()]));
        let zones = vec![Zone::new("A", "bl.test")];
        let use_case = GenerateTasksUseCase::new(source, zones);

        let report = use_case.execute().await.unwrap();

        assert_eq!(report.skipped_prefixes, 0);
        assert_eq!(report.seeds.len(), 2);
        assert!(report
            .seeds
            .contains(&("192.0.2.1".parse().unwrap(), "bl.test".to_string())));
        assert!(report
            .seeds
            .contains(&("192.0.2.2".parse().unwrap(), "bl.test".to_string())));
    }

    #[tokio::test]
    async fn skips_invalid_prefixes_without_failing() {
        let source = Arc::new(FixedPrefixSource(vec![
            "999.999.999.999/24".to_string(),
            "10.0.0.0/30".to_string(),
        ]));
        let zones = vec![Zone::new("A", "bl.test")];
        let use_case = GenerateTasksUseCase::new(source, zones);

        let report = use_case.execute().await.unwrap();

        assert_eq!(report.skipped_prefixes, 1);
        assert_eq!(report.seeds.len(), 2);
    }
}
