//! Badge definitions, award records, and the condition variant.
//!
//! Badge conditions are authored by an external admin surface and stored as
//! JSON. The `type` tag and parameter names below are a compatibility surface
//! shared with existing stored definitions and must be preserved bit-for-bit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::attempt::AttemptStatus;
use super::ids::{AwardId, BadgeId, UserId};

/// Declarative badge earn condition.
///
/// Serialised as an internally tagged object:
///
/// - `{"type": "xp", "threshold": 1000}`
/// - `{"type": "attempt_count", "count": 10, "status": "passed"}`
/// - `{"type": "consecutive_days", "days": 7}`
///
/// The set is closed: adding a kind means adding a variant here and a match
/// arm in the rule engine, never free-form interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BadgeCondition {
    /// Earned once the user's cumulative XP reaches `threshold`.
    Xp {
        /// Minimum total XP required.
        threshold: u64,
    },
    /// Earned once the user has `count` attempts with the given terminal
    /// status.
    AttemptCount {
        /// Minimum number of matching attempts.
        count: u64,
        /// Terminal status the attempts must carry.
        status: AttemptStatus,
    },
    /// Earned once the user's terminal attempts cover `days` consecutive
    /// calendar dates.
    ConsecutiveDays {
        /// Length of the required calendar-date streak.
        days: u32,
    },
}

/// A named achievement with a declarative earn condition.
///
/// Immutable once referenced by an award; created and edited by an external
/// admin collaborator, never by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    /// Badge identity.
    pub id: BadgeId,
    /// Unique display name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Earn condition evaluated by the rule engine.
    pub condition: BadgeCondition,
    /// Optional icon reference for display surfaces.
    pub icon_url: Option<String>,
}

/// Record of a user having earned a specific badge.
///
/// ## Invariants
/// - Unique on `(user_id, badge_id)` forever; the award log enforces this
///   with a conditional insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardedBadge {
    /// Award record identity.
    pub id: AwardId,
    /// User who earned the badge.
    pub user_id: UserId,
    /// Badge that was earned.
    pub badge_id: BadgeId,
    /// When the rule engine granted the badge.
    pub awarded_at: DateTime<Utc>,
    /// Optional free-form context recorded at award time.
    pub metadata: Option<Value>,
}
