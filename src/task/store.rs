use super::types::{TaskId, TaskRecord, TaskState};
use crate::correction::CorrectionResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("task {id} is not ready (state: {state})")]
    NotReady { id: TaskId, state: TaskState },

    #[error("invalid task transition: {from} -> {to}")]
    InvalidTransition { from: TaskState, to: TaskState },

    #[error("task already exists: {0}")]
    Duplicate(TaskId),
}

/// State change applied atomically by [`TaskStore::transition`].
#[derive(Debug, Clone)]
pub struct TaskUpdate {
    pub state: TaskState,
    pub result: Option<CorrectionResult>,
    pub error: Option<String>,
}

impl TaskUpdate {
    pub fn state(state: TaskState) -> Self {
        Self {
            state,
            result: None,
            error: None,
        }
    }

    pub fn with_result(mut self, result: CorrectionResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, record: TaskRecord) -> Result<(), TaskError>;

    async fn get(&self, id: TaskId) -> Result<Option<TaskRecord>, TaskError>;

    /// Compare-and-transition: applies `update` only while the task is still in
    /// `expected` and the state machine allows the edge. Returns the updated
    /// record.
    async fn transition(
        &self,
        id: TaskId,
        expected: TaskState,
        update: TaskUpdate,
    ) -> Result<TaskRecord, TaskError>;

    /// Drops terminal tasks last updated at or before `cutoff` and returns
    /// them. Pending and running tasks are never removed.
    async fn remove_finished_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<TaskRecord>, TaskError>;
}

#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<TaskId, TaskRecord>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, record: TaskRecord) -> Result<(), TaskError> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&record.id) {
            return Err(TaskError::Duplicate(record.id));
        }
        tasks.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, id: TaskId) -> Result<Option<TaskRecord>, TaskError> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn transition(
        &self,
        id: TaskId,
        expected: TaskState,
        update: TaskUpdate,
    ) -> Result<TaskRecord, TaskError> {
        let mut tasks = self.tasks.write().await;
        let record = tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;

        if record.state != expected || !record.state.can_transition_to(update.state) {
            return Err(TaskError::InvalidTransition {
                from: record.state,
                to: update.state,
            });
        }

        record.state = update.state;
        if update.result.is_some() {
            record.result = update.result;
        }
        if update.error.is_some() {
            record.error = update.error;
        }
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    async fn remove_finished_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<TaskRecord>, TaskError> {
        let mut tasks = self.tasks.write().await;
        let expired: Vec<TaskId> = tasks
            .values()
            .filter(|r| r.state.is_terminal() && r.updated_at <= cutoff)
            .map(|r| r.id)
            .collect();

        Ok(expired
            .into_iter()
            .filter_map(|id| tasks.remove(&id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::SynthesisRequest;

    fn record() -> TaskRecord {
        TaskRecord::new(SynthesisRequest::new("hello", "voice").unwrap())
    }

    #[tokio::test]
    async fn transitions_follow_state_machine() {
        let store = InMemoryTaskStore::new();
        let task = record();
        let id = task.id;
        store.insert(task).await.unwrap();

        let running = store
            .transition(id, TaskState::Pending, TaskUpdate::state(TaskState::Running))
            .await
            .unwrap();
        assert_eq!(running.state, TaskState::Running);

        let failed = store
            .transition(
                id,
                TaskState::Running,
                TaskUpdate::state(TaskState::Failed).with_error("boom"),
            )
            .await
            .unwrap();
        assert_eq!(failed.error.as_deref(), Some("boom"));
        assert!(failed.updated_at >= failed.created_at);
    }

    #[tokio::test]
    async fn terminal_state_is_final() {
        let store = InMemoryTaskStore::new();
        let task = record();
        let id = task.id;
        store.insert(task).await.unwrap();
        store
            .transition(id, TaskState::Pending, TaskUpdate::state(TaskState::Cancelled))
            .await
            .unwrap();

        let err = store
            .transition(id, TaskState::Cancelled, TaskUpdate::state(TaskState::Running))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TaskError::InvalidTransition {
                from: TaskState::Cancelled,
                to: TaskState::Running
            }
        );
        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.state, TaskState::Cancelled);
    }

    #[tokio::test]
    async fn stale_expected_state_is_rejected() {
        let store = InMemoryTaskStore::new();
        let task = record();
        let id = task.id;
        store.insert(task).await.unwrap();
        store
            .transition(id, TaskState::Pending, TaskUpdate::state(TaskState::Running))
            .await
            .unwrap();

        // Running -> Cancelled is a legal edge, but the caller expected Pending.
        let err = store
            .transition(id, TaskState::Pending, TaskUpdate::state(TaskState::Cancelled))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TaskError::InvalidTransition {
                from: TaskState::Running,
                to: TaskState::Cancelled
            }
        );
    }

    #[tokio::test]
    async fn unknown_task() {
        let store = InMemoryTaskStore::new();
        let id = TaskId::new();
        assert!(store.get(id).await.unwrap().is_none());
        assert_eq!(
            store
                .transition(id, TaskState::Pending, TaskUpdate::state(TaskState::Running))
                .await
                .unwrap_err(),
            TaskError::NotFound(id)
        );
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = InMemoryTaskStore::new();
        let task = record();
        let id = task.id;
        store.insert(task.clone()).await.unwrap();
        assert_eq!(store.insert(task).await.unwrap_err(), TaskError::Duplicate(id));
    }

    #[tokio::test]
    async fn only_finished_tasks_are_removed() {
        let store = InMemoryTaskStore::new();
        let (pending, running, done) = (record(), record(), record());
        let (pending_id, running_id, done_id) = (pending.id, running.id, done.id);
        for task in [pending, running, done] {
            store.insert(task).await.unwrap();
        }
        store
            .transition(running_id, TaskState::Pending, TaskUpdate::state(TaskState::Running))
            .await
            .unwrap();
        store
            .transition(done_id, TaskState::Pending, TaskUpdate::state(TaskState::Cancelled))
            .await
            .unwrap();

        let before = store
            .remove_finished_before(Utc::now() - chrono::Duration::hours(1))
            .await
            .unwrap();
        assert!(before.is_empty());

        let removed = store.remove_finished_before(Utc::now()).await.unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, done_id);
        assert!(store.get(done_id).await.unwrap().is_none());
        assert!(store.get(pending_id).await.unwrap().is_some());
        assert!(store.get(running_id).await.unwrap().is_some());
    }
}
