pub mod analytic;
pub mod errors;
pub mod ledger;
pub mod logging;
pub mod queue;
pub mod root;

pub use analytic::{MongoConfig, PostgresConfig};
pub use errors::ConfigError;
pub use ledger::LedgerConfig;
pub use logging::LoggingConfig;
pub use queue::QueueConfig;
pub use root::{CliOverrides, Config};
