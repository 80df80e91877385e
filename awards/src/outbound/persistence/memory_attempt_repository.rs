//! In-memory attempt repository adapter.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::attempt::{Attempt, AttemptStatus};
use crate::domain::ids::{AttemptId, UserId};
use crate::domain::ports::{AttemptChange, AttemptRepository, AttemptRepositoryError};

/// Mutex-backed attempt store.
///
/// The conditional transition checks and mutates under one lock, which is the
/// compare-and-set the pipeline's transition guard relies on.
#[derive(Default)]
pub struct MemoryAttemptRepository {
    attempts: Mutex<HashMap<AttemptId, Attempt>>,
}

impl MemoryAttemptRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<AttemptId, Attempt>>, AttemptRepositoryError> {
        self.attempts
            .lock()
            .map_err(|_| AttemptRepositoryError::unavailable("attempt store lock poisoned"))
    }
}

#[async_trait]
impl AttemptRepository for MemoryAttemptRepository {
    async fn insert(&self, attempt: &Attempt) -> Result<(), AttemptRepositoryError> {
        let mut attempts = self.lock()?;
        attempts.insert(attempt.id.clone(), attempt.clone());
        Ok(())
    }

    async fn get(&self, attempt_id: &AttemptId) -> Result<Option<Attempt>, AttemptRepositoryError> {
        let attempts = self.lock()?;
        Ok(attempts.get(attempt_id).cloned())
    }

    async fn conditional_transition(
        &self,
        attempt_id: &AttemptId,
        expected: &[AttemptStatus],
        change: AttemptChange,
    ) -> Result<Attempt, AttemptRepositoryError> {
        let mut attempts = self.lock()?;
        let attempt = attempts
            .get_mut(attempt_id)
            .ok_or_else(|| AttemptRepositoryError::not_found(attempt_id.to_string()))?;
        if !expected.contains(&attempt.status) {
            return Err(AttemptRepositoryError::state_conflict(attempt.status));
        }
        match change {
            AttemptChange::Submit {
                score,
                solution,
                submitted_at,
            } => {
                attempt.status = AttemptStatus::Submitted;
                attempt.score = Some(score);
                attempt.solution = solution;
                attempt.submitted_at = Some(submitted_at);
            }
            AttemptChange::Finalize { status, xp_awarded } => {
                attempt.status = status;
                attempt.xp_awarded = Some(xp_awarded);
            }
        }
        Ok(attempt.clone())
    }

    async fn count_with_status(
        &self,
        user_id: &UserId,
        status: AttemptStatus,
    ) -> Result<u64, AttemptRepositoryError> {
        let attempts = self.lock()?;
        let count = attempts
            .values()
            .filter(|attempt| attempt.user_id == *user_id && attempt.status == status)
            .count();
        Ok(count as u64)
    }

    async fn terminal_dates(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<NaiveDate>, AttemptRepositoryError> {
        let attempts = self.lock()?;
        let dates: BTreeSet<NaiveDate> = attempts
            .values()
            .filter(|attempt| attempt.user_id == *user_id && attempt.is_terminal())
            .filter_map(|attempt| attempt.submitted_at.map(|at| at.date_naive()))
            .collect();
        Ok(dates.into_iter().collect())
    }
}
