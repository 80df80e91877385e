//! Award pipeline orchestration.
//!
//! `process(attempt_id)` turns one submitted attempt into its terminal
//! effects: XP computed, ledger credited, rank cache refreshed, badges
//! evaluated. The dispatcher may deliver the same job more than once and may
//! run different attempts for the same user concurrently; every step commits
//! independently and is individually idempotent, so redelivery resumes
//! partial progress instead of corrupting it.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::DomainResult;
use crate::domain::attempt::{Attempt, AttemptStatus};
use crate::domain::error::Error;
use crate::domain::ids::{AttemptId, BadgeId, UserId};
use crate::domain::ports::{
    AttemptChange, AttemptRepository, AttemptRepositoryError, AwardLog, BadgeDirectory,
    ChallengeDirectory, ChallengeDirectoryError, RankCache, RankCacheError, ScoreLedger,
    ScoreLedgerError,
};
use crate::domain::progression;
use crate::domain::rules::RuleEngine;

/// Pipeline tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwardPipelineConfig {
    /// Minimum score for a `passed` outcome. Sub-threshold attempts still
    /// earn their proportional XP.
    pub passing_threshold: u8,
    /// In-run retry budget for the rank cache write before the job is handed
    /// back to the dispatcher.
    pub cache_write_attempts: u32,
}

impl Default for AwardPipelineConfig {
    fn default() -> Self {
        Self {
            passing_threshold: 70,
            cache_write_attempts: 3,
        }
    }
}

/// Port bundle required by the pipeline.
pub struct AwardPipelinePorts {
    /// Attempt persistence and history queries.
    pub attempts: Arc<dyn AttemptRepository>,
    /// Challenge catalogue lookups.
    pub challenges: Arc<dyn ChallengeDirectory>,
    /// Authoritative XP totals.
    pub ledger: Arc<dyn ScoreLedger>,
    /// Ordered leaderboard projection.
    pub rank_cache: Arc<dyn RankCache>,
    /// Badge definition lookups.
    pub badges: Arc<dyn BadgeDirectory>,
    /// Persisted badge awards.
    pub awards: Arc<dyn AwardLog>,
}

/// Summary of one pipeline execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Attempt the job referenced.
    pub attempt_id: AttemptId,
    /// Terminal status the attempt holds after the run.
    pub status: AttemptStatus,
    /// XP recorded for the attempt.
    pub xp_awarded: u32,
    /// The user's cumulative XP as written to the rank cache.
    pub total_xp: u64,
    /// Badges newly earned during this run.
    pub new_badges: Vec<BadgeId>,
    /// True when the attempt was already terminal on entry and the run only
    /// replayed the idempotent tail.
    pub replayed: bool,
}

/// Orchestrates the award sequence for one attempt at a time.
pub struct AwardPipeline {
    attempts: Arc<dyn AttemptRepository>,
    challenges: Arc<dyn ChallengeDirectory>,
    ledger: Arc<dyn ScoreLedger>,
    rank_cache: Arc<dyn RankCache>,
    rules: RuleEngine,
    config: AwardPipelineConfig,
}

impl AwardPipeline {
    /// Build a pipeline over the given ports.
    pub fn new(ports: AwardPipelinePorts, clock: Arc<dyn Clock>, config: AwardPipelineConfig) -> Self {
        let rules = RuleEngine::new(
            ports.badges,
            ports.awards,
            Arc::clone(&ports.attempts),
            Arc::clone(&ports.ledger),
            clock,
        );
        Self {
            attempts: ports.attempts,
            challenges: ports.challenges,
            ledger: ports.ledger,
            rank_cache: ports.rank_cache,
            rules,
            config,
        }
    }

    /// Execute the award sequence for `attempt_id`.
    ///
    /// Safe to invoke more than once per attempt: a terminal attempt replays
    /// only the idempotent tail (ledger replay check, cache refresh, rule
    /// evaluation), whose net effect is zero unless an earlier delivery
    /// crashed mid-run, in which case the replay completes it.
    pub async fn process(&self, attempt_id: &AttemptId) -> DomainResult<ProcessOutcome> {
        let attempt = self
            .attempts
            .get(attempt_id)
            .await
            .map_err(map_attempt_error)?
            .ok_or_else(|| Error::not_found(format!("attempt {attempt_id} was not found")))?;

        if attempt.is_terminal() {
            tracing::debug!(attempt = %attempt_id, "terminal attempt redelivered; replaying idempotent tail");
            return self.replay_tail(&attempt).await;
        }

        let challenge = self
            .challenges
            .get(&attempt.challenge_id)
            .await
            .map_err(map_challenge_error)?
            .ok_or_else(|| {
                Error::not_found(format!("challenge {} was not found", attempt.challenge_id))
            })?;
        let score = attempt
            .score
            .ok_or_else(|| Error::invalid_state("attempt carries no score to award"))?;

        let xp = progression::xp_awarded(challenge.xp, score);
        let status = if progression::is_passing(score, self.config.passing_threshold) {
            AttemptStatus::Passed
        } else {
            AttemptStatus::Failed
        };

        // The expected-status guard makes exactly one delivery win this
        // transition; losers converge on the winner's outcome below.
        let finalized = match self
            .attempts
            .conditional_transition(
                attempt_id,
                &[AttemptStatus::Submitted],
                AttemptChange::Finalize {
                    status,
                    xp_awarded: xp,
                },
            )
            .await
        {
            Ok(updated) => updated,
            Err(AttemptRepositoryError::StateConflict { actual }) if actual.is_terminal() => {
                let current = self
                    .attempts
                    .get(attempt_id)
                    .await
                    .map_err(map_attempt_error)?
                    .ok_or_else(|| {
                        Error::not_found(format!("attempt {attempt_id} was not found"))
                    })?;
                tracing::debug!(attempt = %attempt_id, "lost terminal transition race; replaying idempotent tail");
                return self.replay_tail(&current).await;
            }
            Err(error) => return Err(map_attempt_error(error)),
        };

        let award = self
            .ledger
            .atomic_award(&finalized.user_id, attempt_id, xp)
            .await
            .map_err(map_ledger_error)?;
        if !award.newly_applied {
            // The transition guard should make this unreachable; the ledger's
            // idempotency key is defence in depth.
            tracing::warn!(attempt = %attempt_id, "ledger had already applied this attempt");
        }

        let total_xp = self.refresh_rank(&finalized.user_id).await?;
        let new_badges = badge_ids(self.rules.evaluate(&finalized.user_id).await?);

        tracing::info!(
            attempt = %attempt_id,
            user = %finalized.user_id,
            status = %status,
            xp,
            total_xp,
            "attempt scored"
        );
        Ok(ProcessOutcome {
            attempt_id: attempt_id.clone(),
            status,
            xp_awarded: xp,
            total_xp,
            new_badges,
            replayed: false,
        })
    }

    /// Re-run the idempotent steps for an attempt that is already terminal.
    ///
    /// Covers both plain duplicate deliveries (every step no-ops) and
    /// deliveries that resume a run which crashed between the terminal
    /// transition and the later steps.
    async fn replay_tail(&self, attempt: &Attempt) -> DomainResult<ProcessOutcome> {
        let xp = attempt.xp_awarded.unwrap_or(0);
        let award = self
            .ledger
            .atomic_award(&attempt.user_id, &attempt.id, xp)
            .await
            .map_err(map_ledger_error)?;
        if award.newly_applied {
            tracing::warn!(
                attempt = %attempt.id,
                user = %attempt.user_id,
                xp,
                "ledger award completed by redelivery after an interrupted run"
            );
        }

        let total_xp = self.refresh_rank(&attempt.user_id).await?;
        let new_badges = badge_ids(self.rules.evaluate(&attempt.user_id).await?);
        Ok(ProcessOutcome {
            attempt_id: attempt.id.clone(),
            status: attempt.status,
            xp_awarded: xp,
            total_xp,
            new_badges,
            replayed: true,
        })
    }

    /// Write the user's authoritative total to the rank cache, retrying the
    /// cache write alone (with a fresh ledger read each time) before giving
    /// the job back to the dispatcher.
    async fn refresh_rank(&self, user_id: &UserId) -> DomainResult<u64> {
        let budget = self.config.cache_write_attempts.max(1);
        let mut last_error: Option<RankCacheError> = None;
        for _ in 0..budget {
            let total = self
                .ledger
                .total_xp(user_id)
                .await
                .map_err(map_ledger_error)?;
            match self.rank_cache.update(user_id, total).await {
                Ok(()) => return Ok(total),
                Err(error) => {
                    tracing::warn!(
                        user = %user_id,
                        error = %error,
                        "rank cache write failed; retrying with a fresh total"
                    );
                    last_error = Some(error);
                }
            }
        }
        let error = last_error
            .unwrap_or_else(|| RankCacheError::unavailable("rank cache retries exhausted"));
        Err(Error::unavailable(error.to_string()))
    }
}

fn badge_ids(awards: Vec<crate::domain::badge::AwardedBadge>) -> Vec<BadgeId> {
    awards.into_iter().map(|award| award.badge_id).collect()
}

fn map_attempt_error(error: AttemptRepositoryError) -> Error {
    match error {
        AttemptRepositoryError::NotFound { attempt_id } => {
            Error::not_found(format!("attempt {attempt_id} was not found"))
        }
        AttemptRepositoryError::StateConflict { actual } => {
            Error::invalid_state(format!("attempt is already {actual}"))
        }
        AttemptRepositoryError::Unavailable { message } => {
            Error::unavailable(format!("attempt store unavailable: {message}"))
        }
    }
}

fn map_challenge_error(error: ChallengeDirectoryError) -> Error {
    Error::unavailable(error.to_string())
}

fn map_ledger_error(error: ScoreLedgerError) -> Error {
    Error::unavailable(error.to_string())
}
