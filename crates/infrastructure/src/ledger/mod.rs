mod sqlite_task_ledger;

pub use sqlite_task_ledger::SqliteTaskLedger;
