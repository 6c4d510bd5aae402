//! Composition of the application use cases into the one job this
//! crate runs: a full daily screening pass (C4-C8).

pub mod daily_run;
pub mod worker_pool_driver;

pub use daily_run::{DailyRunJob, DailyRunJobConfig};
pub use worker_pool_driver::{PoolReport, WorkerPoolDriver};
