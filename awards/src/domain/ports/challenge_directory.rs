//! Port abstraction for challenge lookups.

use async_trait::async_trait;

use crate::domain::challenge::ChallengeSummary;
use crate::domain::ids::ChallengeId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by challenge directory adapters.
    pub enum ChallengeDirectoryError {
        /// Directory storage is temporarily unreachable.
        Unavailable { message: String } => [transient] "challenge directory unavailable: {message}",
    }
}

/// Read-only port over the externally managed challenge catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChallengeDirectory: Send + Sync {
    /// Fetch a challenge summary by id.
    async fn get(
        &self,
        challenge_id: &ChallengeId,
    ) -> Result<Option<ChallengeSummary>, ChallengeDirectoryError>;
}
