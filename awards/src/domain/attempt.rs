//! Attempt entity and its status state machine.
//!
//! An attempt is one user's try at one challenge. The status machine is
//! `started → submitted → {passed, failed}`; `passed` and `failed` are
//! terminal and only the award pipeline performs the terminal transition.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ids::{AttemptId, ChallengeId, UserId};

/// Attempt lifecycle status.
///
/// Serialised in lowercase (`"started"`, `"submitted"`, `"passed"`,
/// `"failed"`); the spelling is shared with stored badge conditions and must
/// not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    /// The user began the challenge but has not sent a solution.
    Started,
    /// A solution arrived; the award job may still be in flight.
    Submitted,
    /// Scored at or above the passing threshold. Terminal.
    Passed,
    /// Scored below the passing threshold. Terminal.
    Failed,
}

impl AttemptStatus {
    /// True for `passed` and `failed`, the two terminal states.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Started => "started",
            Self::Submitted => "submitted",
            Self::Passed => "passed",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// One user's try at one challenge.
///
/// ## Invariants
/// - `xp_awarded` is written at most once, by the award pipeline, at the
///   terminal transition; it never changes afterwards.
/// - `score` and `submitted_at` are present from `submitted` onwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    /// Attempt identity; also the ledger idempotency key.
    pub id: AttemptId,
    /// Owning user.
    pub user_id: UserId,
    /// Challenge being attempted.
    pub challenge_id: ChallengeId,
    /// Current lifecycle status.
    pub status: AttemptStatus,
    /// Raw score in [0, 100], recorded at submission.
    pub score: Option<u8>,
    /// XP granted at the terminal transition.
    pub xp_awarded: Option<u32>,
    /// When the user began the challenge.
    pub started_at: DateTime<Utc>,
    /// When the most recent solution arrived.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Free-form solution payload supplied at submission.
    pub solution: Option<Value>,
}

impl Attempt {
    /// Build a fresh attempt in the `started` state.
    pub fn started(
        id: AttemptId,
        user_id: UserId,
        challenge_id: ChallengeId,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            challenge_id,
            status: AttemptStatus::Started,
            score: None,
            xp_awarded: None,
            started_at,
            submitted_at: None,
            solution: None,
        }
    }

    /// True once the attempt has reached `passed` or `failed`.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
