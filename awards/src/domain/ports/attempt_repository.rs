//! Port abstraction for attempt persistence.
//!
//! The repository owns the attempt state machine's durability. The
//! conditional transition is the concurrency primitive the pipeline leans on:
//! the expected-status check and the mutation commit atomically, so two
//! racing deliveries of the same job cannot both win a transition.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::domain::attempt::{Attempt, AttemptStatus};
use crate::domain::ids::{AttemptId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by attempt repository adapters.
    pub enum AttemptRepositoryError {
        /// No attempt exists under the given id.
        NotFound { attempt_id: String } => "attempt {attempt_id} was not found",
        /// The attempt was not in any of the expected states.
        StateConflict { actual: AttemptStatus } => "attempt is already {actual}",
        /// Storage is temporarily unreachable.
        Unavailable { message: String } => [transient] "attempt store unavailable: {message}",
    }
}

/// Mutation applied together with a status transition.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptChange {
    /// Record (or overwrite) the pending solution and move to `submitted`.
    Submit {
        /// Raw score in [0, 100].
        score: u8,
        /// Free-form solution payload.
        solution: Option<Value>,
        /// Submission instant.
        submitted_at: DateTime<Utc>,
    },
    /// Move to a terminal status and persist the computed award.
    Finalize {
        /// Terminal status (`passed` or `failed`).
        status: AttemptStatus,
        /// XP granted for this attempt.
        xp_awarded: u32,
    },
}

/// Port for attempt storage, transitions, and the history queries the rule
/// engine evaluates against.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Persist a freshly started attempt.
    async fn insert(&self, attempt: &Attempt) -> Result<(), AttemptRepositoryError>;

    /// Fetch an attempt by id.
    async fn get(&self, attempt_id: &AttemptId) -> Result<Option<Attempt>, AttemptRepositoryError>;

    /// Atomically check the current status against `expected` and apply
    /// `change`, returning the updated attempt.
    ///
    /// Fails with [`AttemptRepositoryError::StateConflict`] carrying the
    /// actual status when the check does not hold; the caller decides whether
    /// the conflict means "lost the race" or "invalid request".
    async fn conditional_transition(
        &self,
        attempt_id: &AttemptId,
        expected: &[AttemptStatus],
        change: AttemptChange,
    ) -> Result<Attempt, AttemptRepositoryError>;

    /// Number of the user's attempts currently in `status`.
    async fn count_with_status(
        &self,
        user_id: &UserId,
        status: AttemptStatus,
    ) -> Result<u64, AttemptRepositoryError>;

    /// Distinct calendar dates (UTC) on which the user's terminal attempts
    /// were submitted, in ascending order.
    async fn terminal_dates(&self, user_id: &UserId)
    -> Result<Vec<NaiveDate>, AttemptRepositoryError>;
}
