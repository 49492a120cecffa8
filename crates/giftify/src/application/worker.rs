//! Gift Worker - Background processing of gifts
//!
//! Requests and scheduler ticks only persist the gift and enqueue a job.
//! The worker drains the queue, running up to `concurrency` jobs at once,
//! and hands each job's outcome back through its [`JobTicket`].

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Semaphore};
use uuid::Uuid;

use super::gift_service::GiftService;
use crate::domain::{DomainError, Gift};

/// Unit of background work for one gift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftJob {
    /// Run selection; surprise gifts continue straight into dispatch
    Pick(Uuid),
    /// Place the order for an `ORDERED` gift
    Dispatch(Uuid),
}

impl GiftJob {
    pub fn gift_id(&self) -> Uuid {
        match self {
            Self::Pick(id) | Self::Dispatch(id) => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pick(_) => "pick",
            Self::Dispatch(_) => "dispatch",
        }
    }
}

struct Envelope {
    job: GiftJob,
    reply: oneshot::Sender<Result<Gift, DomainError>>,
}

/// Handle for submitting jobs to the worker
#[derive(Clone)]
pub struct GiftQueue {
    sender: mpsc::UnboundedSender<Envelope>,
}

/// Receiving half of a [`GiftQueue`], consumed by [`GiftWorker`]
pub struct GiftJobs {
    receiver: mpsc::UnboundedReceiver<Envelope>,
}

impl GiftQueue {
    pub fn channel() -> (Self, GiftJobs) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, GiftJobs { receiver })
    }

    /// Enqueue a job. Fails only when the worker has shut down.
    pub fn submit(&self, job: GiftJob) -> Result<JobTicket, DomainError> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(Envelope { job, reply })
            .map_err(|_| DomainError::Internal("gift worker is not running".to_string()))?;
        Ok(JobTicket {
            job,
            receiver,
        })
    }
}

/// Completion handle for a submitted job
#[derive(Debug)]
pub struct JobTicket {
    job: GiftJob,
    receiver: oneshot::Receiver<Result<Gift, DomainError>>,
}

impl JobTicket {
    pub fn job(&self) -> GiftJob {
        self.job
    }

    /// Wait for the job's final gift (or its error)
    pub async fn wait(self) -> Result<Gift, DomainError> {
        self.receiver.await.map_err(|_| {
            DomainError::Internal(format!(
                "gift worker dropped {} job for gift {}",
                self.job.kind(),
                self.job.gift_id()
            ))
        })?
    }
}

/// Worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum number of gifts processed at once
    pub concurrency: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { concurrency: 8 }
    }
}

/// Background gift processor
pub struct GiftWorker {
    service: Arc<GiftService>,
    jobs: GiftJobs,
    config: WorkerConfig,
}

impl GiftWorker {
    pub fn new(service: Arc<GiftService>, jobs: GiftJobs, config: WorkerConfig) -> Self {
        Self {
            service,
            jobs,
            config,
        }
    }

    /// Start the worker (runs in background until every queue handle is dropped)
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(mut self) {
        let permits = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        tracing::info!(
            "🎁 Gift worker started (concurrency: {})",
            self.config.concurrency.max(1)
        );

        while let Some(Envelope { job, reply }) = self.jobs.receiver.recv().await {
            let permit = match permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let service = self.service.clone();

            tokio::spawn(async move {
                let _permit = permit;
                let result = service.process(job).await;

                match &result {
                    Ok(gift) => tracing::info!(
                        gift_id = %gift.id,
                        "✅ {} job finished ({})",
                        job.kind(),
                        gift.status
                    ),
                    Err(e) if e.is_conflict() => tracing::warn!(
                        gift_id = %job.gift_id(),
                        "⏭️ {} job skipped: {}",
                        job.kind(),
                        e
                    ),
                    Err(e) => tracing::error!(
                        gift_id = %job.gift_id(),
                        "❌ {} job failed: {}",
                        job.kind(),
                        e
                    ),
                }

                // The submitter may have stopped listening
                let _ = reply.send(result);
            });
        }

        tracing::info!("🎁 Gift worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::Harness;
    use crate::domain::GiftStatus;

    #[tokio::test]
    async fn test_ticket_reports_final_gift() {
        let harness = Harness::new().await;
        let submission = harness
            .gifts
            .create_gift(harness.surprise_request())
            .await
            .unwrap();

        let ticket = submission.ticket.unwrap();
        assert_eq!(ticket.job(), GiftJob::Pick(submission.gift.id));
        let gift = ticket.wait().await.unwrap();
        assert_eq!(gift.status, GiftStatus::Shipped);
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_fails() {
        let (queue, jobs) = GiftQueue::channel();
        drop(jobs);
        let err = queue.submit(GiftJob::Dispatch(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }

    #[tokio::test]
    async fn test_dropped_job_surfaces_error() {
        let (queue, jobs) = GiftQueue::channel();
        let ticket = queue.submit(GiftJob::Pick(Uuid::new_v4())).unwrap();
        drop(jobs);
        assert!(matches!(ticket.wait().await, Err(DomainError::Internal(_))));
    }
}
