//! Worker-pool dispatcher for award jobs.
//!
//! The dispatcher decouples the synchronous submission path from pipeline
//! execution: submission enqueues, workers dequeue and drive the pipeline.
//! Delivery is at-least-once and unordered; retryable failures back off with
//! jitter inside the delivering worker, and a job that exhausts its budget
//! (or fails permanently) becomes a dead-letter record.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::error::Error;
use crate::domain::pipeline::AwardPipeline;
use crate::domain::ports::{AwardJob, AwardQueue, DeadLetter};

mod runtime;

pub use runtime::{AttemptJitter, AwardDispatcherRuntime, BackoffJitter, Sleeper, TokioSleeper};

/// Dispatcher tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwardDispatcherConfig {
    /// Number of concurrent pipeline workers.
    pub worker_count: usize,
    /// Maximum delivery attempts per job (including the first).
    pub max_delivery_attempts: u32,
    /// Initial retry backoff.
    pub initial_backoff: Duration,
    /// Maximum retry backoff cap.
    pub max_backoff: Duration,
    /// Idle wait between polls of an empty queue.
    pub poll_interval: Duration,
    /// Wall-clock budget for one pipeline execution; an overrun counts as a
    /// transient failure and triggers redelivery.
    pub job_timeout: Duration,
}

impl Default for AwardDispatcherConfig {
    fn default() -> Self {
        Self {
            worker_count: 2,
            max_delivery_attempts: 5,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            poll_interval: Duration::from_millis(25),
            job_timeout: Duration::from_secs(30),
        }
    }
}

/// Handle over the spawned worker pool.
pub struct DispatcherHandle {
    shutdown: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
}

impl DispatcherHandle {
    /// Signal the workers to stop and wait for them to drain.
    ///
    /// A worker mid-delivery finishes its current job first; queued jobs stay
    /// queued for the next start.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// Pulls award jobs from the queue and drives the pipeline.
pub struct AwardDispatcher {
    queue: Arc<dyn AwardQueue>,
    pipeline: Arc<AwardPipeline>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    jitter: Arc<dyn BackoffJitter>,
    config: AwardDispatcherConfig,
}

impl AwardDispatcher {
    /// Build a dispatcher using default runtime dependencies.
    pub fn new(
        queue: Arc<dyn AwardQueue>,
        pipeline: Arc<AwardPipeline>,
        clock: Arc<dyn Clock>,
        config: AwardDispatcherConfig,
    ) -> Self {
        Self::with_runtime(
            queue,
            pipeline,
            clock,
            AwardDispatcherRuntime::default(),
            config,
        )
    }

    /// Build a dispatcher with injected runtime abstractions.
    pub fn with_runtime(
        queue: Arc<dyn AwardQueue>,
        pipeline: Arc<AwardPipeline>,
        clock: Arc<dyn Clock>,
        runtime: AwardDispatcherRuntime,
        config: AwardDispatcherConfig,
    ) -> Self {
        Self {
            queue,
            pipeline,
            clock,
            sleeper: runtime.sleeper,
            jitter: runtime.jitter,
            config,
        }
    }

    /// Spawn the worker pool onto the current tokio runtime.
    pub fn spawn(self: &Arc<Self>) -> DispatcherHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker_count = self.config.worker_count.max(1);
        let workers = (0..worker_count)
            .map(|worker| {
                let dispatcher = Arc::clone(self);
                let shutdown = shutdown_rx.clone();
                tokio::spawn(async move {
                    dispatcher.worker_loop(worker, shutdown).await;
                })
            })
            .collect();
        DispatcherHandle {
            shutdown: shutdown_tx,
            workers,
        }
    }

    async fn worker_loop(&self, worker: usize, mut shutdown: watch::Receiver<bool>) {
        tracing::debug!(worker, "award worker started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            match self.queue.dequeue().await {
                Ok(Some(job)) => self.deliver(job).await,
                Ok(None) => {
                    tokio::select! {
                        _ = shutdown.changed() => {},
                        () = self.sleeper.sleep(self.config.poll_interval) => {},
                    }
                }
                Err(error) => {
                    tracing::warn!(worker, error = %error, "award queue dequeue failed");
                    tokio::select! {
                        _ = shutdown.changed() => {},
                        () = self.sleeper.sleep(self.config.poll_interval) => {},
                    }
                }
            }
        }
        tracing::debug!(worker, "award worker stopped");
    }

    /// Drive one job to success, retry exhaustion, or permanent failure.
    async fn deliver(&self, job: AwardJob) {
        let budget = self.config.max_delivery_attempts.max(1);
        for attempt in 1..=budget {
            let run = tokio::time::timeout(
                self.config.job_timeout,
                self.pipeline.process(&job.attempt_id),
            )
            .await;
            let result = match run {
                Ok(result) => result,
                Err(_elapsed) => Err(Error::unavailable("award job timed out")),
            };

            match result {
                Ok(outcome) => {
                    if outcome.replayed {
                        tracing::debug!(attempt_id = %job.attempt_id, "award job replayed");
                    }
                    return;
                }
                Err(error) if error.is_retryable() && attempt < budget => {
                    let base = self.retry_base_delay(attempt);
                    let delay = self.jitter.jittered_delay(base, attempt, self.clock.utc());
                    tracing::warn!(
                        attempt_id = %job.attempt_id,
                        attempt,
                        error = %error,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "award job failed; backing off before retry"
                    );
                    self.sleeper.sleep(delay).await;
                }
                Err(error) => {
                    self.record_dead_letter(&job, &error, attempt).await;
                    return;
                }
            }
        }
    }

    async fn record_dead_letter(&self, job: &AwardJob, error: &Error, attempts: u32) {
        tracing::error!(
            attempt_id = %job.attempt_id,
            attempts,
            error = %error,
            "award job dead-lettered"
        );
        let letter = DeadLetter {
            attempt_id: job.attempt_id.clone(),
            reason: error.to_string(),
            delivery_attempts: attempts,
            failed_at: self.clock.utc(),
        };
        if let Err(record_error) = self.queue.dead_letter(letter).await {
            // Nothing left to do but shout; the attempt stays `submitted` and
            // the reconciliation sweep will re-enqueue it.
            tracing::error!(
                attempt_id = %job.attempt_id,
                error = %record_error,
                "failed to record dead letter"
            );
        }
    }

    fn retry_base_delay(&self, attempt: u32) -> Duration {
        let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let base_ms =
            u64::try_from(self.config.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.config.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
    }
}
