use super::store::{TaskError, TaskStore, TaskUpdate};
use super::types::{TaskId, TaskRecord, TaskState, TaskStatus};
use crate::correction::{
    AudioCorrectionLoop, CancelFlag, CorrectionResult, CorrectionStatus, SynthesisRequest,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tracing::Instrument;

/// Runs correction loops off the request path and tracks them in a
/// [`TaskStore`]. Cheap to clone; clones share the same store and workers.
#[derive(Clone)]
pub struct TaskRunner {
    correction: Arc<AudioCorrectionLoop>,
    store: Arc<dyn TaskStore>,
    permits: Arc<Semaphore>,
    cancel_flags: Arc<Mutex<HashMap<TaskId, CancelFlag>>>,
}

impl TaskRunner {
    /// At most `worker_concurrency` loops run at once; the rest wait as
    /// `Pending`.
    pub fn new(
        correction: Arc<AudioCorrectionLoop>,
        store: Arc<dyn TaskStore>,
        worker_concurrency: usize,
    ) -> Self {
        Self {
            correction,
            store,
            permits: Arc::new(Semaphore::new(worker_concurrency.max(1))),
            cancel_flags: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Records a `Pending` task and schedules it. Returns without waiting for
    /// any attempt.
    pub async fn submit(&self, request: SynthesisRequest) -> Result<TaskId, TaskError> {
        let record = TaskRecord::new(request.clone());
        let task_id = record.id;
        self.store.insert(record).await?;

        let cancel = CancelFlag::new();
        if let Ok(mut flags) = self.cancel_flags.lock() {
            flags.insert(task_id, cancel.clone());
        }

        tracing::info!(
            task_id = %task_id,
            max_attempts = request.max_attempts(),
            threshold = request.accuracy_threshold(),
            "Correction task submitted"
        );

        let runner = self.clone();
        let span = tracing::info_span!("correction_task", task_id = %task_id);
        tokio::spawn(async move { runner.execute(task_id, request, cancel).await }.instrument(span));

        Ok(task_id)
    }

    pub async fn get_status(&self, task_id: TaskId) -> Result<TaskStatus, TaskError> {
        Ok(self.record(task_id).await?.status())
    }

    /// Available only once the task has `Succeeded`.
    pub async fn get_result(&self, task_id: TaskId) -> Result<CorrectionResult, TaskError> {
        let record = self.record(task_id).await?;
        match (record.state, record.result) {
            (TaskState::Succeeded, Some(result)) => Ok(result),
            (state, _) => Err(TaskError::NotReady { id: task_id, state }),
        }
    }

    /// Requests cooperative cancellation and returns the resulting status.
    ///
    /// A `Pending` task is cancelled immediately. A `Running` task stops before
    /// its next attempt. Terminal tasks are left as they are.
    pub async fn cancel(&self, task_id: TaskId) -> Result<TaskStatus, TaskError> {
        let record = self.record(task_id).await?;
        if record.state.is_terminal() {
            return Ok(record.status());
        }

        if let Ok(flags) = self.cancel_flags.lock() {
            if let Some(flag) = flags.get(&task_id) {
                flag.cancel();
            }
        }

        if record.state == TaskState::Pending {
            let update = TaskUpdate::state(TaskState::Cancelled)
                .with_result(CorrectionResult::cancelled(Vec::new()));
            match self
                .store
                .transition(task_id, TaskState::Pending, update)
                .await
            {
                Ok(cancelled) => {
                    tracing::info!(task_id = %task_id, "Pending task cancelled");
                    return Ok(cancelled.status());
                }
                // Picked up by a worker in the meantime; the flag stops it.
                Err(TaskError::InvalidTransition { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        tracing::info!(task_id = %task_id, "Cancellation requested for running task");
        self.get_status(task_id).await
    }

    async fn record(&self, task_id: TaskId) -> Result<TaskRecord, TaskError> {
        self.store
            .get(task_id)
            .await?
            .ok_or(TaskError::NotFound(task_id))
    }

    async fn execute(&self, task_id: TaskId, request: SynthesisRequest, cancel: CancelFlag) {
        let _permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                tracing::error!(error = %e, "Worker pool closed before task could start");
                self.forget(task_id);
                return;
            }
        };

        if let Err(e) = self
            .store
            .transition(task_id, TaskState::Pending, TaskUpdate::state(TaskState::Running))
            .await
        {
            tracing::debug!(error = %e, "Task no longer pending, skipping");
            self.forget(task_id);
            return;
        }
        tracing::info!("Correction task started");

        // Run on its own task so a panic inside a collaborator surfaces as a
        // JoinError instead of leaving the record stuck in Running.
        let correction = self.correction.clone();
        let handle = tokio::spawn(
            async move { correction.run_with_cancel(&request, &cancel).await }.in_current_span(),
        );

        let update = match handle.await {
            Ok(result) => outcome(result),
            Err(e) => {
                tracing::error!(error = %e, "Correction task aborted");
                TaskUpdate::state(TaskState::Failed).with_error(format!("correction aborted: {}", e))
            }
        };
        let final_state = update.state;

        match self
            .store
            .transition(task_id, TaskState::Running, update)
            .await
        {
            Ok(_) => tracing::info!(state = %final_state, "Correction task finished"),
            Err(e) => tracing::error!(error = %e, "Failed to record task outcome"),
        }

        self.forget(task_id);
    }

    fn forget(&self, task_id: TaskId) {
        if let Ok(mut flags) = self.cancel_flags.lock() {
            flags.remove(&task_id);
        }
    }
}

/// Maps a loop outcome onto the task state machine. Quality shortfall still
/// counts as a successful run.
fn outcome(result: CorrectionResult) -> TaskUpdate {
    match result.status {
        CorrectionStatus::Success | CorrectionStatus::ExhaustedAttempts => {
            TaskUpdate::state(TaskState::Succeeded).with_result(result)
        }
        CorrectionStatus::Failed => {
            let error = result
                .error
                .clone()
                .unwrap_or_else(|| "correction failed".to_string());
            TaskUpdate::state(TaskState::Failed)
                .with_error(error)
                .with_result(result)
        }
        CorrectionStatus::Cancelled => TaskUpdate::state(TaskState::Cancelled).with_result(result),
    }
}
