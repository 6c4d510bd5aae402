use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;

use crate::errors::DomainError;

/// A parsed IPv4 CIDR block, expanded exactly once per run into its
/// host-IP enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefix(Ipv4Network);

impl Prefix {
    pub fn parse(cidr: &str) -> Result<Self, DomainError> {
        let network: Ipv4Network = cidr
            .parse()
            .map_err(|_| DomainError::InvalidCidr(cidr.to_string()))?;
        Ok(Self(network))
    }

    /// Host addresses of this prefix, excluding the network and
    /// broadcast addresses — matching standard `hosts()` semantics.
    /// `/31` and `/32` have no distinct network/broadcast pair, so both
    /// (or the single) address is returned unchanged.
    pub fn hosts(&self) -> Vec<Ipv4Addr> {
        let prefix_len = self.0.prefix();
        if prefix_len >= 31 {
            return self.0.iter().collect();
        }

        let network = self.0.network();
        let broadcast = self.0.broadcast();
        self.0
            .iter()
            .filter(|ip| *ip != network && *ip != broadcast)
            .collect()
    }
}
