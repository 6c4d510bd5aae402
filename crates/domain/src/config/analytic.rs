use serde::{Deserialize, Serialize};

/// Connection parameters for the analytic store's Postgres backend.
/// `None` entirely when the analytic store is not configured (the
/// Promoter is then a no-op — see DESIGN.md).
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PostgresConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub db: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl PostgresConfig {
    pub fn is_configured(&self) -> bool {
        self.host.is_some() && self.db.is_some()
    }

    pub fn connection_url(&self) -> Option<String> {
        if !self.is_configured() {
            return None;
        }
        Some(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username.as_deref().unwrap_or(""),
            self.password.as_deref().unwrap_or(""),
            self.host.as_deref().unwrap_or("localhost"),
            self.port.unwrap_or(5432),
            self.db.as_deref().unwrap_or(""),
        ))
    }
}

/// `MONGO_URL`/`MONGO_DB_NAME` are accepted for forward-compatibility
/// with the source's earlier variant but are not read by the core; see
/// DESIGN.md's "latest variant is authoritative" note.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct MongoConfig {
    pub url: Option<String>,
    pub db_name: Option<String>,
}
