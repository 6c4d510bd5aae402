use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct ParseTaskStatusError(String);

impl fmt::Display for ParseTaskStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid task status: '{}'", self.0)
    }
}

impl std::error::Error for ParseTaskStatusError {}

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(ParseTaskStatusError(other.to_string())),
        }
    }
}

/// Terminal classification of a single DNSBL probe. `None` on the wire
/// (and in the ledger) means the task is still `pending` (invariant I2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskResult {
    NotListed,
    Listed,
    TimedOut,
    NoAnswer,
    NoNameservers,
    DnsError,
    InvalidIp,
    Exception,
}

impl TaskResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotListed => "not_listed",
            Self::Listed => "listed",
            Self::TimedOut => "timed_out",
            Self::NoAnswer => "no_answer",
            Self::NoNameservers => "no_nameservers",
            Self::DnsError => "dns_error",
            Self::InvalidIp => "invalid_ip",
            Self::Exception => "exception",
        }
    }

    /// Every terminal result maps to `completed` except internal
    /// failures, which map to `failed` (I3: no unexpected-error result
    /// is ever reported as a clean completion).
    pub fn status(&self) -> TaskStatus {
        match self {
            Self::Exception => TaskStatus::Failed,
            _ => TaskStatus::Completed,
        }
    }
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct ParseTaskResultError(String);

impl fmt::Display for ParseTaskResultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid task result: '{}'", self.0)
    }
}

impl std::error::Error for ParseTaskResultError {}

impl FromStr for TaskResult {
    type Err = ParseTaskResultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_listed" => Ok(Self::NotListed),
            "listed" => Ok(Self::Listed),
            "timed_out" => Ok(Self::TimedOut),
            "no_answer" => Ok(Self::NoAnswer),
            "no_nameservers" => Ok(Self::NoNameservers),
            "dns_error" => Ok(Self::DnsError),
            "invalid_ip" => Ok(Self::InvalidIp),
            "exception" => Ok(Self::Exception),
            other => Err(ParseTaskResultError(other.to_string())),
        }
    }
}

/// Identified by `(ip, dns, check_date)` (invariant I1).
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub ip: Ipv4Addr,
    pub dns: String,
    pub check_date: NaiveDate,
    pub status: TaskStatus,
    pub result: Option<TaskResult>,
    pub details: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Task {
    pub fn pending(ip: Ipv4Addr, dns: impl Into<String>, check_date: NaiveDate) -> Self {
        Self {
            ip,
            dns: dns.into(),
            check_date,
            status: TaskStatus::Pending,
            result: None,
            details: None,
            last_updated: None,
        }
    }

    pub fn key(&self) -> (Ipv4Addr, String) {
        (self.ip, self.dns.clone())
    }
}

/// The outcome of a single Task seed that identifies it before it is
/// inserted into the ledger: `(ip, dns)` for today.
pub type TaskSeed = (Ipv4Addr, String);

/// An element of a `BulkUpdate` batch handed to the ledger by the
/// worker pool's drain step.
#[derive(Debug, Clone)]
pub struct TaskUpdate {
    pub ip: Ipv4Addr,
    pub dns: String,
    pub result: TaskResult,
    pub details: Option<String>,
}

impl TaskUpdate {
    pub fn status(&self) -> TaskStatus {
        self.result.status()
    }
}
