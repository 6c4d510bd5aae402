use serde::{Deserialize, Serialize};

/// Connection and batching parameters for the Task Ledger (C2).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_bulk_update_count")]
    pub bulk_update_count: usize,

    /// Supplemental feature (see SPEC_FULL §10): rows older than this
    /// many days are purged before a run's generation step. `0`
    /// disables the purge, which is the default so a fresh run never
    /// destroys history by surprise.
    #[serde(default)]
    pub retention_days: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bulk_update_count: default_bulk_update_count(),
            retention_days: 0,
        }
    }
}

fn default_db_path() -> String {
    "dnsbl_ledger.db".to_string()
}

fn default_bulk_update_count() -> usize {
    500
}
