// Task Module - asynchronous tracking of correction runs

mod retention;
mod runner;
mod store;
mod types;

pub use retention::{purge_expired, spawn_retention_sweeper};
pub use runner::TaskRunner;
pub use store::{InMemoryTaskStore, TaskError, TaskStore, TaskUpdate};
pub use types::{TaskId, TaskRecord, TaskState, TaskStatus};
