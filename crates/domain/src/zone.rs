use serde::{Deserialize, Serialize};

/// A blocklist identity. Immutable within a run; the full set is
/// configuration-fixed at process start.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Zone {
    pub name: String,
    pub dns: String,
    #[serde(default)]
    pub removal_link: Option<String>,
    #[serde(default)]
    pub removal_method: Option<String>,
}

impl Zone {
    pub fn new(name: impl Into<String>, dns: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dns: dns.into(),
            removal_link: None,
            removal_method: None,
        }
    }
}
