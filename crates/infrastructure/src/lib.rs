//! Concrete adapters for the ports declared in `dnsbl-application`:
//! SQLite ledger, RabbitMQ queue, `hickory-resolver` prober, Postgres
//! analytic store, YAML prefix source, and a tracing-backed reporter.

pub mod analytic_store;
pub mod ledger;
pub mod prefix_source;
pub mod prober;
pub mod queue;
pub mod reporter;

pub use analytic_store::{NoopAnalyticStore, PostgresAnalyticStore};
pub use ledger::SqliteTaskLedger;
pub use prefix_source::YamlPrefixSource;
pub use prober::HickoryDnsblProber;
pub use queue::RabbitMqWorkQueue;
pub use reporter::TracingReporter;
