use serde::{Deserialize, Serialize};

use crate::zone::Zone;

use super::analytic::{MongoConfig, PostgresConfig};
use super::errors::ConfigError;
use super::ledger::LedgerConfig;
use super::logging::LoggingConfig;
use super::queue::QueueConfig;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sqlite: LedgerConfig,

    #[serde(default)]
    pub rabbitmq: QueueConfig,

    #[serde(default)]
    pub postgresql: PostgresConfig,

    #[serde(default)]
    pub mongo: MongoConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub blacklists: Vec<Zone>,

    #[serde(default = "default_prefixes_path")]
    pub prefixes_path: String,
}

impl Config {
    /// Loads the file selected by `path` (or `RUN_ENV`'s default
    /// location), then layers environment variables on top (the
    /// configuration surface is env-first), then CLI overrides, then
    /// validates.
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_default_location(),
        };

        config.apply_env_overrides()?;
        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_default_location() -> Self {
        let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "local".to_string());
        let candidate = format!("config/{run_env}.toml");
        if std::path::Path::new(&candidate).exists() {
            return Self::from_file(&candidate).unwrap_or_default();
        }
        Self::default()
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(v) = env_or_file("RABBITMQ_HOST")? {
            self.rabbitmq.host = v;
        }
        if let Some(v) = env_or_file("RABBITMQ_PORT")? {
            self.rabbitmq.port = v
                .parse()
                .map_err(|_| ConfigError::Validation(format!("invalid RABBITMQ_PORT: {v}")))?;
        }
        if let Some(v) = env_or_file("RABBITMQ_USERNAME")? {
            self.rabbitmq.username = v;
        }
        if let Some(v) = env_or_file("RABBITMQ_PASSWORD")? {
            self.rabbitmq.password = v;
        }
        if let Some(v) = env_or_file("RABBITMQ_DEFAULT_QUEUE")? {
            self.rabbitmq.default_queue = v;
        }
        if let Some(v) = env_or_file("RABBITMQ_CONCURRENCY_LIMIT")? {
            self.rabbitmq.concurrency_limit = v.parse().map_err(|_| {
                ConfigError::Validation(format!("invalid RABBITMQ_CONCURRENCY_LIMIT: {v}"))
            })?;
        }

        if let Some(v) = env_or_file("POSTGRES_HOST")? {
            self.postgresql.host = Some(v);
        }
        if let Some(v) = env_or_file("POSTGRES_PORT")? {
            self.postgresql.port = Some(
                v.parse()
                    .map_err(|_| ConfigError::Validation(format!("invalid POSTGRES_PORT: {v}")))?,
            );
        }
        if let Some(v) = env_or_file("POSTGRES_DB")? {
            self.postgresql.db = Some(v);
        }
        if let Some(v) = env_or_file("POSTGRES_USERNAME")? {
            self.postgresql.username = Some(v);
        }
        if let Some(v) = env_or_file("POSTGRES_PASSWORD")? {
            self.postgresql.password = Some(v);
        }

        if let Some(v) = env_or_file("MONGO_URL")? {
            self.mongo.url = Some(v);
        }
        if let Some(v) = env_or_file("MONGO_DB_NAME")? {
            self.mongo.db_name = Some(v);
        }

        if let Some(v) = env_or_file("APP_LOG_PATH")? {
            self.logging.app_log_path = Some(v);
        }
        if let Some(v) = env_or_file("ERROR_LOG_PATH")? {
            self.logging.error_log_path = Some(v);
        }

        Ok(())
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(db_path) = overrides.db_path {
            self.sqlite.db_path = db_path;
        }
        if let Some(prefixes_path) = overrides.prefixes_path {
            self.prefixes_path = prefixes_path;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blacklists.is_empty() {
            return Err(ConfigError::Validation(
                "no blacklist zones configured".to_string(),
            ));
        }
        if self.sqlite.bulk_update_count == 0 {
            return Err(ConfigError::Validation(
                "sqlite.bulk_update_count must be greater than zero".to_string(),
            ));
        }
        if self.rabbitmq.concurrency_limit == 0 {
            return Err(ConfigError::Validation(
                "RABBITMQ_CONCURRENCY_LIMIT must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reads an environment variable, falling back to the file named by
/// `<key>_FILE` (the Docker/K8s secret-file convention).
fn env_or_file(key: &str) -> Result<Option<String>, ConfigError> {
    if let Ok(v) = std::env::var(key) {
        return Ok(Some(v));
    }

    let file_key = format!("{key}_FILE");
    match std::env::var(&file_key) {
        Ok(path) => {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::SecretFileRead(path, file_key, e.to_string()))?;
            Ok(Some(contents.trim().to_string()))
        }
        Err(_) => Ok(None),
    }
}

fn default_prefixes_path() -> String {
    "prefixes.yaml".to_string()
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub db_path: Option<String>,
    pub prefixes_path: Option<String>,
    pub log_level: Option<String>,
}
