mod analytic_store;
mod dnsbl_prober;
mod prefix_source;
mod reporter;
mod task_ledger;
mod work_queue;

pub use analytic_store::AnalyticStore;
pub use dnsbl_prober::{DnsblProber, ProbeOutcome};
pub use prefix_source::PrefixSource;
pub use reporter::Reporter;
pub use task_ledger::{TaskLedger, TaskStatusCounts};
pub use work_queue::{Delivery, WorkQueue};
