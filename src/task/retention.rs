use super::store::{TaskError, TaskStore};
use crate::storage::{AudioStore, StorageError};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Removes tasks that finished more than `retention` ago, together with the
/// audio their attempts reference. Returns the number of tasks removed.
pub async fn purge_expired(
    tasks: &dyn TaskStore,
    audio: &dyn AudioStore,
    retention: Duration,
) -> Result<usize, TaskError> {
    let cutoff = match chrono::Duration::from_std(retention)
        .ok()
        .and_then(|age| Utc::now().checked_sub_signed(age))
    {
        Some(cutoff) => cutoff,
        None => return Ok(0),
    };

    let expired = tasks.remove_finished_before(cutoff).await?;
    for record in &expired {
        let attempts = record.result.iter().flat_map(|result| &result.attempts);
        for attempt in attempts {
            match audio.delete(&attempt.audio_reference).await {
                Ok(()) | Err(StorageError::NotFound(_)) => {}
                Err(e) => tracing::warn!(
                    task_id = %record.id,
                    reference = %attempt.audio_reference,
                    error = %e,
                    "Failed to delete expired audio"
                ),
            }
        }
    }

    if !expired.is_empty() {
        tracing::info!(removed = expired.len(), "Expired correction tasks purged");
    }
    Ok(expired.len())
}

/// Purges expired tasks every `every` until the runtime shuts down.
pub fn spawn_retention_sweeper(
    tasks: Arc<dyn TaskStore>,
    audio: Arc<dyn AudioStore>,
    retention: Duration,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = purge_expired(tasks.as_ref(), audio.as_ref(), retention).await {
                tracing::error!(error = %e, "Task retention sweep failed");
            }
        }
    })
}
