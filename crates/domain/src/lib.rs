//! Domain layer: entities and value objects for the DNSBL screening
//! pipeline. No I/O, no framework types — ports and adapters build on
//! top of this.
pub mod analytic_row;
pub mod config;
pub mod errors;
pub mod prefix;
pub mod queue_message;
pub mod run_summary;
pub mod task;
pub mod zone;

pub use analytic_row::AnalyticRow;
pub use config::{CliOverrides, Config};
pub use errors::DomainError;
pub use prefix::Prefix;
pub use queue_message::QueueMessage;
pub use run_summary::RunSummary;
pub use task::{Task, TaskResult, TaskSeed, TaskStatus, TaskUpdate};
pub use zone::Zone;
