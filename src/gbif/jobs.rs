use super::services::SyncSummary;
use crate::common::errors::ApiError;
use crate::common::models::ProcessingStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use utoipa::ToSchema;
use uuid::Uuid;

/// Snapshot of the most recent background sync
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SyncJobStatus {
    pub job_id: Uuid,
    pub status: ProcessingStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub result: Option<SyncSummary>,
    pub error: Option<String>,
}

struct SyncJob {
    status: SyncJobStatus,
    handle: Option<JoinHandle<()>>,
}

/// Tracks the single background sync task. Holds its `JoinHandle` so the
/// outcome can be polled and the task awaited on shutdown.
#[derive(Clone, Default)]
pub struct SyncTracker {
    current: Arc<Mutex<Option<SyncJob>>>,
}

impl SyncTracker {
    fn lock(&self) -> MutexGuard<'_, Option<SyncJob>> {
        // A panic while holding the lock leaves plain data behind, keep using it
        self.current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Spawn `work` unless a job is already pending or running.
    pub fn start<F>(&self, work: F) -> Result<SyncJobStatus, ApiError>
    where
        F: Future<Output = Result<SyncSummary, ApiError>> + Send + 'static,
    {
        let mut current = self.lock();
        if let Some(job) = current.as_ref() {
            // A finished handle with an unfinished status means the task panicked
            let task_gone = job.handle.as_ref().is_some_and(JoinHandle::is_finished);
            if !job.status.status.is_finished() && !task_gone {
                return Err(ApiError::Conflict {
                    resource: "GBIF sync".to_string(),
                    message: format!("job {} is still running", job.status.job_id),
                });
            }
        }

        let job_id = Uuid::new_v4();
        let status = SyncJobStatus {
            job_id,
            status: ProcessingStatus::Pending,
            started_at: Utc::now(),
            finished_at: None,
            result: None,
            error: None,
        };

        let tracker = self.clone();
        let handle = tokio::spawn(async move {
            tracker.update(job_id, |s| s.status = ProcessingStatus::InProgress);
            let outcome = work.await;
            tracker.update(job_id, |s| {
                s.finished_at = Some(Utc::now());
                match outcome {
                    Ok(summary) => {
                        s.status = ProcessingStatus::Completed;
                        s.result = Some(summary);
                    }
                    Err(err) => {
                        tracing::error!(%job_id, error = %err, "Background GBIF sync failed");
                        s.status = ProcessingStatus::Failed;
                        s.error = Some(err.to_string());
                    }
                }
            });
        });

        *current = Some(SyncJob {
            status: status.clone(),
            handle: Some(handle),
        });
        tracing::info!(%job_id, "Started background GBIF sync");
        Ok(status)
    }

    fn update(&self, job_id: Uuid, apply: impl FnOnce(&mut SyncJobStatus)) {
        if let Some(job) = self.lock().as_mut().filter(|job| job.status.job_id == job_id) {
            apply(&mut job.status);
        }
    }

    /// Status of the most recent job. A task that ended without recording an
    /// outcome panicked, so it is reported as failed.
    pub fn latest(&self) -> Option<SyncJobStatus> {
        let mut current = self.lock();
        let job = current.as_mut()?;
        let task_gone = job.handle.as_ref().is_some_and(JoinHandle::is_finished);
        if task_gone && !job.status.status.is_finished() {
            tracing::error!(job_id = %job.status.job_id, "Background GBIF sync task panicked");
            job.status.status = ProcessingStatus::Failed;
            job.status.finished_at = Some(Utc::now());
            job.status.error = Some("sync task panicked".to_string());
        }
        Some(job.status.clone())
    }

    /// Wait for the current job, if any, and return its final status.
    pub async fn join_current(&self) -> Option<SyncJobStatus> {
        let handle = self.lock().as_mut().and_then(|job| job.handle.take());
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                tracing::error!(error = %err, "Background GBIF sync task panicked");
                let job_id = self.latest()?.job_id;
                self.update(job_id, |s| {
                    s.status = ProcessingStatus::Failed;
                    s.finished_at = Some(Utc::now());
                    s.error = Some(err.to_string());
                });
            }
        }
        self.latest()
    }
}
