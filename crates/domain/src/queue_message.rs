use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// Wire format of a single queued task. Fields beyond `ip` and `dns`
/// are accepted but ignored by the prober.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    pub ip: Ipv4Addr,
    pub dns: String,
}

impl QueueMessage {
    pub fn new(ip: Ipv4Addr, dns: impl Into<String>) -> Self {
        Self { ip, dns: dns.into() }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_unknown_fields() {
        let raw = br#"{"ip":"1.2.3.4","dns":"bl.test","source":"generator","extra":42}"#;
        let msg = QueueMessage::from_json(raw).unwrap();
        assert_eq!(msg.ip, "1.2.3.4".parse::<Ipv4Addr>().unwrap());
        assert_eq!(msg.dns, "bl.test");
    }

    #[test]
    fn round_trips() {
        let msg = QueueMessage::new("10.0.0.1".parse().unwrap(), "bl.test");
        let bytes = msg.to_json().unwrap();
        let back = QueueMessage::from_json(&bytes).unwrap();
        assert_eq!(msg.ip, back.ip);
        assert_eq!(msg.dns, back.dns);
    }
}
