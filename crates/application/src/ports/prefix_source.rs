use async_trait::async_trait;
use dnsbl_domain::DomainError;

/// Reads the raw CIDR string list the generator expands. Kept as a
/// port so `dnsbl-application` never names a file format or parser
/// directly.
#[async_trait]
pub trait PrefixSource: Send + Sync {
    async fn load(&self) -> Result<Vec<String>, DomainError>;
}
