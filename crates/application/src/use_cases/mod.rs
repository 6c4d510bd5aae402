mod generate_tasks;
mod promote_listed_tasks;
mod synchronize_tasks;
mod worker_pool;

pub use generate_tasks::{GenerateReport, GenerateTasksUseCase};
pub use promote_listed_tasks::PromoteListedTasksUseCase;
pub use synchronize_tasks::{SyncReport, SynchronizeTasksUseCase};
pub use worker_pool::{UpdateBuffer, WorkerPoolUseCase};
