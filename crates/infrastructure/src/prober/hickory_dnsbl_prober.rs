use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dnsbl_application::ports::{DnsblProber, ProbeOutcome};
use dnsbl_domain::TaskResult;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::rr::rdata::txt::TXT;
use hickory_resolver::TokioAsyncResolver;
use tracing::instrument;

const PER_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);
const OVERALL_DEADLINE: Duration = Duration::from_secs(5);

/// `DnsblProber` adapter built on `hickory-resolver`, the query-side
/// sibling of the `hickory-proto`/`hickory-server` family.
pub struct HickoryDnsblProber {
    resolver: TokioAsyncResolver,
}

impl HickoryDnsblProber {
    pub fn new() -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = PER_ATTEMPT_TIMEOUT;
        opts.attempts = 1;
        let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), opts);
        Self { resolver }
    }

    fn reverse_query_name(ip: Ipv4Addr, zone_dns: &str) -> String {
        let [a, b, c, d] = ip.octets();
        format!("{d}.{c}.{b}.{a}.{zone_dns}")
    }

    async fn probe_inner(&self, ip: Ipv4Addr, zone_dns: &str) -> ProbeOutcome {
        if ip.is_unspecified() {
            return ProbeOutcome::new(
                TaskResult::InvalidIp,
                Some("0.0.0.0 has no meaningful reverse lookup".to_string()),
            );
        }

        let query_name = Self::reverse_query_name(ip, zone_dns);

        let a_result = self.resolver.ipv4_lookup(&query_name).await;
        let a_records = match a_result {
            Ok(lookup) => lookup,
            Err(err) => return Self::classify_error(&err),
        };

        if a_records.iter().next().is_none() {
            return ProbeOutcome::new(TaskResult::NoAnswer, None);
        }

        let first_a = a_records.iter().next().map(|r| r.0.to_string()).unwrap_or_default();

        let details = match self.resolver.txt_lookup(&query_name).await {
            Ok(txt_records) => txt_records
                .iter()
                .next()
                .map(|txt: &TXT| format!("{a}: {}", txt_to_string(txt), a = first_a)),
            Err(_) => Some(first_a),
        };

        ProbeOutcome::new(TaskResult::Listed, details)
    }

    fn classify_error(
        err: &hickory_resolver::error::ResolveError,
    ) -> ProbeOutcome {
        match err.kind() {
            ResolveErrorKind::NoRecordsFound { response_code, .. } => {
                use hickory_resolver::proto::op::ResponseCode;
                if *response_code == ResponseCode::NXDomain {
                    ProbeOutcome::new(TaskResult::NotListed, None)
                } else {
                    ProbeOutcome::new(TaskResult::NoAnswer, None)
                }
            }
            ResolveErrorKind::Timeout => {
                ProbeOutcome::new(TaskResult::TimedOut, Some("timed out".to_string()))
            }
            ResolveErrorKind::NoConnections => {
                ProbeOutcome::new(TaskResult::NoNameservers, Some(err.to_string()))
            }
            _ => ProbeOutcome::new(TaskResult::DnsError, Some(err.to_string())),
        }
    }
}

impl Default for HickoryDnsblProber {
    fn default() -> Self {
        Self::new()
    }
}

fn txt_to_string(txt: &TXT) -> String {
    txt.iter()
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl DnsblProber for HickoryDnsblProber {
    #[instrument(skip(self), fields(ip = %ip, dns = %zone_dns, latency_ms = tracing::field::Empty))]
    async fn probe(&self, ip: Ipv4Addr, zone_dns: &str) -> ProbeOutcome {
        let started = Instant::now();
        let outcome = match tokio::time::timeout(OVERALL_DEADLINE, self.probe_inner(ip, zone_dns))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => ProbeOutcome::new(TaskResult::TimedOut, Some("timed out".to_string())),
        };

        tracing::Span::current().record("latency_ms", started.elapsed().as_millis() as i64);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverses_octets_and_appends_zone() {
        let ip: Ipv4Addr = "1.2.3.4".parse().unwrap();
        assert_eq!(
            HickoryDnsblProber::reverse_query_name(ip, "zen.example"),
            "4.3.2.1.zen.example"
        );
    }

    #[tokio::test]
    async fn unspecified_address_is_invalid() {
        let prober = HickoryDnsblProber::new();
        let outcome = prober.probe_inner(Ipv4Addr::UNSPECIFIED, "bl.test").await;
        assert_eq!(outcome.result, TaskResult::InvalidIp);
    }
}
