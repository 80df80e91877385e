//! Rule engine evaluating badge conditions for one user.
//!
//! The engine runs inside the award pipeline after the ledger write. Each
//! badge's earn decision is independent of evaluation order, and award
//! persistence is a conditional insert, so re-running an evaluation that
//! partially failed can only fill gaps, never double-award.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::DomainResult;
use crate::domain::badge::{AwardedBadge, BadgeCondition};
use crate::domain::error::Error;
use crate::domain::ids::{AwardId, UserId};
use crate::domain::ports::{
    AttemptRepository, AttemptRepositoryError, AwardLog, AwardLogError, BadgeDirectory,
    BadgeDirectoryError, ScoreLedger, ScoreLedgerError,
};

mod streak;

/// Evaluates badge definitions against ledger and attempt-history state.
pub struct RuleEngine {
    badges: Arc<dyn BadgeDirectory>,
    awards: Arc<dyn AwardLog>,
    attempts: Arc<dyn AttemptRepository>,
    ledger: Arc<dyn ScoreLedger>,
    clock: Arc<dyn Clock>,
}

impl RuleEngine {
    /// Build an engine over the given ports.
    pub fn new(
        badges: Arc<dyn BadgeDirectory>,
        awards: Arc<dyn AwardLog>,
        attempts: Arc<dyn AttemptRepository>,
        ledger: Arc<dyn ScoreLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            badges,
            awards,
            attempts,
            ledger,
            clock,
        }
    }

    /// Evaluate every configured badge for `user_id` and persist the newly
    /// earned ones.
    ///
    /// The ledger total is re-read here rather than passed in: a sibling
    /// attempt for the same user may have advanced it since the caller's
    /// pipeline run computed its own award.
    pub async fn evaluate(&self, user_id: &UserId) -> DomainResult<Vec<AwardedBadge>> {
        let definitions = self.badges.definitions().await.map_err(map_badge_error)?;
        if definitions.is_empty() {
            return Ok(Vec::new());
        }

        let earned = self
            .awards
            .earned_badge_ids(user_id)
            .await
            .map_err(map_award_error)?;
        let total_xp = self
            .ledger
            .total_xp(user_id)
            .await
            .map_err(map_ledger_error)?;

        let mut newly_awarded = Vec::new();
        for definition in definitions {
            if earned.contains(&definition.id) {
                continue;
            }
            if !self
                .condition_met(user_id, total_xp, &definition.condition)
                .await?
            {
                continue;
            }

            let award = AwardedBadge {
                id: AwardId::random(),
                user_id: user_id.clone(),
                badge_id: definition.id.clone(),
                awarded_at: self.clock.utc(),
                metadata: None,
            };
            if self
                .awards
                .insert_if_absent(&award)
                .await
                .map_err(map_award_error)?
            {
                tracing::info!(user = %user_id, badge = %definition.name, "badge awarded");
                newly_awarded.push(award);
            }
            // A false insert means a concurrent evaluation for the same user
            // got there first; uniqueness holds either way.
        }
        Ok(newly_awarded)
    }

    async fn condition_met(
        &self,
        user_id: &UserId,
        total_xp: u64,
        condition: &BadgeCondition,
    ) -> DomainResult<bool> {
        match condition {
            BadgeCondition::Xp { threshold } => Ok(total_xp >= *threshold),
            BadgeCondition::AttemptCount { count, status } => {
                let have = self
                    .attempts
                    .count_with_status(user_id, *status)
                    .await
                    .map_err(map_attempt_error)?;
                Ok(have >= *count)
            }
            BadgeCondition::ConsecutiveDays { days } => {
                let dates = self
                    .attempts
                    .terminal_dates(user_id)
                    .await
                    .map_err(map_attempt_error)?;
                Ok(streak::longest_run(&dates) >= u64::from(*days))
            }
        }
    }
}

fn map_badge_error(error: BadgeDirectoryError) -> Error {
    Error::unavailable(error.to_string())
}

fn map_award_error(error: AwardLogError) -> Error {
    Error::unavailable(error.to_string())
}

fn map_ledger_error(error: ScoreLedgerError) -> Error {
    Error::unavailable(error.to_string())
}

fn map_attempt_error(error: AttemptRepositoryError) -> Error {
    if error.is_transient() {
        Error::unavailable(error.to_string())
    } else {
        Error::internal(error.to_string())
    }
}

#[cfg(test)]
mod tests;
