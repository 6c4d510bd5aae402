use std::net::Ipv4Addr;

use async_trait::async_trait;
use dnsbl_domain::TaskResult;

/// Outcome of a single reverse-IP DNSBL lookup.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub result: TaskResult,
    pub details: Option<String>,
}

impl ProbeOutcome {
    pub fn new(result: TaskResult, details: Option<String>) -> Self {
        Self { result, details }
    }
}

/// Performs the reverse-IP DNS query against a single blocklist zone
/// (C1). Implementations never return `Err` — every failure mode is a
/// terminal `TaskResult` variant (timed_out, dns_error, exception, ...).
#[async_trait]
pub trait DnsblProber: Send + Sync {
    async fn probe(&self, ip: Ipv4Addr, zone_dns: &str) -> ProbeOutcome;
}
