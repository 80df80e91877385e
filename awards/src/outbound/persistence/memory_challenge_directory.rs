//! In-memory challenge directory adapter.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::challenge::ChallengeSummary;
use crate::domain::ids::ChallengeId;
use crate::domain::ports::{ChallengeDirectory, ChallengeDirectoryError};

/// Mutex-backed challenge catalogue.
#[derive(Default)]
pub struct MemoryChallengeDirectory {
    challenges: Mutex<HashMap<ChallengeId, ChallengeSummary>>,
}

impl MemoryChallengeDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a challenge summary.
    pub fn upsert(&self, summary: ChallengeSummary) -> Result<(), ChallengeDirectoryError> {
        let mut challenges = self
            .challenges
            .lock()
            .map_err(|_| ChallengeDirectoryError::unavailable("challenge directory lock poisoned"))?;
        challenges.insert(summary.id.clone(), summary);
        Ok(())
    }
}

#[async_trait]
impl ChallengeDirectory for MemoryChallengeDirectory {
    async fn get(
        &self,
        challenge_id: &ChallengeId,
    ) -> Result<Option<ChallengeSummary>, ChallengeDirectoryError> {
        let challenges = self
            .challenges
            .lock()
            .map_err(|_| ChallengeDirectoryError::unavailable("challenge directory lock poisoned"))?;
        Ok(challenges.get(challenge_id).cloned())
    }
}
