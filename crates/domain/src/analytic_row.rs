use std::net::Ipv4Addr;

use chrono::{DateTime, NaiveDate, Utc};

use crate::task::{Task, TaskResult, TaskStatus};

/// A row promoted into the long-term analytic store. Unique on
/// `(ip_address, dns, check_date)`; upsert semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticRow {
    pub ip_address: Ipv4Addr,
    pub dns: String,
    pub status: TaskStatus,
    pub result: TaskResult,
    pub check_date: NaiveDate,
    pub last_updated: DateTime<Utc>,
}

impl AnalyticRow {
    /// Builds an analytic row from a ledger `Task`, returning `None` if
    /// the task is not a `listed` terminal result (nothing else is
    /// promoted).
    pub fn from_listed_task(task: &Task) -> Option<Self> {
        let result = task.result?;
        if result != TaskResult::Listed {
            return None;
        }

        Some(Self {
            ip_address: task.ip,
            dns: task.dns.clone(),
            status: task.status,
            result,
            check_date: task.check_date,
            last_updated: task.last_updated.unwrap_or_else(Utc::now),
        })
    }
}
