//! In-memory award queue adapter.
//!
//! A process-local queue for single-node deployments and tests. Delivery is
//! at-least-once from the dispatcher's point of view (a worker that fails a
//! job re-runs it; the pipeline's idempotency absorbs the duplicates), and
//! nothing here deduplicates — that is deliberate, handlers own idempotency.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{AwardJob, AwardQueue, AwardQueueError, DeadLetter};

/// Mutex-backed FIFO queue with a dead-letter side list.
#[derive(Default)]
pub struct MemoryAwardQueue {
    jobs: Mutex<VecDeque<AwardJob>>,
    dead: Mutex<Vec<DeadLetter>>,
}

impl MemoryAwardQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs currently waiting.
    pub fn len(&self) -> usize {
        self.jobs.lock().map_or(0, |jobs| jobs.len())
    }

    /// True when no job is waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the recorded dead letters, oldest first.
    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        self.dead.lock().map_or_else(|_| Vec::new(), |dead| dead.clone())
    }
}

#[async_trait]
impl AwardQueue for MemoryAwardQueue {
    async fn enqueue(&self, job: AwardJob) -> Result<(), AwardQueueError> {
        let mut jobs = self
            .jobs
            .lock()
            .map_err(|_| AwardQueueError::unavailable("award queue lock poisoned"))?;
        jobs.push_back(job);
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<AwardJob>, AwardQueueError> {
        let mut jobs = self
            .jobs
            .lock()
            .map_err(|_| AwardQueueError::unavailable("award queue lock poisoned"))?;
        Ok(jobs.pop_front())
    }

    async fn dead_letter(&self, letter: DeadLetter) -> Result<(), AwardQueueError> {
        let mut dead = self
            .dead
            .lock()
            .map_err(|_| AwardQueueError::unavailable("award queue lock poisoned"))?;
        dead.push(letter);
        Ok(())
    }
}
