//! Port describing queue dispatch semantics for award jobs.
//!
//! The queue promises at-least-once delivery and no ordering, nothing more.
//! Handlers own idempotency; the queue is never trusted to deduplicate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::AttemptId;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by queue adapters.
    pub enum AwardQueueError {
        /// Queue infrastructure is unavailable.
        Unavailable { message: String } => [transient] "award queue is unavailable: {message}",
        /// The job could not be acknowledged or persisted.
        Rejected { message: String } => "award job was rejected: {message}",
    }
}

/// One unit of award work: score the referenced attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardJob {
    /// Attempt to process.
    pub attempt_id: AttemptId,
}

/// Terminal failure record for a job that exhausted its retry budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetter {
    /// Attempt the failed job referenced.
    pub attempt_id: AttemptId,
    /// Human-readable failure summary for operators.
    pub reason: String,
    /// Number of delivery attempts consumed.
    pub delivery_attempts: u32,
    /// When the job was given up on.
    pub failed_at: DateTime<Utc>,
}

/// Port for award job dispatch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AwardQueue: Send + Sync {
    /// Enqueue a job for downstream processing.
    async fn enqueue(&self, job: AwardJob) -> Result<(), AwardQueueError>;

    /// Pop the next job, or `None` when the queue is empty.
    async fn dequeue(&self) -> Result<Option<AwardJob>, AwardQueueError>;

    /// Record a job that exhausted its retry budget for manual inspection.
    async fn dead_letter(&self, letter: DeadLetter) -> Result<(), AwardQueueError>;
}
