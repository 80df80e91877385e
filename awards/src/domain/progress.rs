//! Read-only progress and leaderboard queries.
//!
//! These queries never write. Totals come from the ledger, ranks from the
//! rank cache; the two agree once the pipeline has quiesced for a user, and
//! in between the cache is at worst stale, never wrong.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::DomainResult;
use crate::domain::badge::AwardedBadge;
use crate::domain::error::Error;
use crate::domain::ids::UserId;
use crate::domain::ports::{AwardLog, RankCache, ScoreLedger};
use crate::domain::progression;

/// One user's progression snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// User the snapshot describes.
    pub user_id: UserId,
    /// Cumulative XP from the authoritative ledger.
    pub total_xp: u64,
    /// Level derived from `total_xp`.
    pub level: u32,
    /// XP still missing to reach the next level.
    pub xp_to_next_level: u64,
    /// 1-based leaderboard rank, absent while the user is below the ranking
    /// floor or the cache has not caught up yet.
    pub rank: Option<u64>,
}

/// One leaderboard page row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    /// Ranked user.
    pub user_id: UserId,
    /// Score held by the rank cache.
    pub total_xp: u64,
    /// 1-based rank within the page's ordering.
    pub rank: u64,
}

/// Read-path service over ledger, rank cache, and award log.
pub struct ProgressService {
    ledger: Arc<dyn ScoreLedger>,
    rank_cache: Arc<dyn RankCache>,
    awards: Arc<dyn AwardLog>,
}

impl ProgressService {
    /// Build a service over the given ports.
    pub fn new(
        ledger: Arc<dyn ScoreLedger>,
        rank_cache: Arc<dyn RankCache>,
        awards: Arc<dyn AwardLog>,
    ) -> Self {
        Self {
            ledger,
            rank_cache,
            awards,
        }
    }

    /// Progression snapshot for one user.
    pub async fn progress(&self, user_id: &UserId) -> DomainResult<ProgressSnapshot> {
        let total_xp = self
            .ledger
            .total_xp(user_id)
            .await
            .map_err(|error| Error::unavailable(error.to_string()))?;
        let rank = self
            .rank_cache
            .rank_of(user_id)
            .await
            .map_err(|error| Error::unavailable(error.to_string()))?;
        Ok(ProgressSnapshot {
            user_id: user_id.clone(),
            total_xp,
            level: progression::level_for_xp(total_xp),
            xp_to_next_level: progression::xp_to_next_level(total_xp),
            rank,
        })
    }

    /// Top `limit` leaderboard rows in descending score order.
    pub async fn leaderboard(&self, limit: usize) -> DomainResult<Vec<LeaderboardRow>> {
        let entries = self
            .rank_cache
            .top_k(limit)
            .await
            .map_err(|error| Error::unavailable(error.to_string()))?;
        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(position, entry)| LeaderboardRow {
                user_id: entry.user_id,
                total_xp: entry.score,
                rank: position as u64 + 1,
            })
            .collect())
    }

    /// Every badge award the user holds, oldest first.
    pub async fn badges(&self, user_id: &UserId) -> DomainResult<Vec<AwardedBadge>> {
        self.awards
            .list_for_user(user_id)
            .await
            .map_err(|error| Error::unavailable(error.to_string()))
    }
}
