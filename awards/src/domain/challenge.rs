//! Challenge summary consumed by the award pipeline.
//!
//! Challenge content lives with an external collaborator; the engine only
//! reads the summary projection exposed through the challenge directory port.

use serde::{Deserialize, Serialize};

use super::ids::ChallengeId;

/// Challenge difficulty tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeDifficulty {
    /// Entry-level challenges.
    Easy,
    /// Intermediate challenges.
    Medium,
    /// Advanced challenges.
    Hard,
}

/// Read-only projection of a challenge.
///
/// The pipeline consumes only `xp` and `published`; the remaining fields are
/// carried so boundary layers can render the directory without a second
/// lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeSummary {
    /// Challenge identity.
    pub id: ChallengeId,
    /// Display title.
    pub title: String,
    /// Base XP granted for a perfect score.
    pub xp: u32,
    /// Difficulty tier.
    pub difficulty: ChallengeDifficulty,
    /// Free-form discovery tags.
    pub tags: Vec<String>,
    /// Unpublished challenges cannot be started.
    pub published: bool,
}
