//! In-memory rank cache adapter.
//!
//! Wraps the ordered [`ScoreIndex`] in a read-write lock: pipeline workers
//! take the write side for upserts, read-path queries share the read side.
//! The port contract matches what a Redis sorted set (`ZADD`, `ZREVRANGE`,
//! `ZREVRANK`) would provide, so a networked adapter can replace this one
//! without touching the domain.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::ids::UserId;
use crate::domain::leaderboard::{RankEntry, ScoreIndex};
use crate::domain::ports::{RankCache, RankCacheError};

/// Process-local rank cache over an order-statistics index.
pub struct MemoryRankCache {
    index: RwLock<ScoreIndex>,
    floor: u64,
}

impl MemoryRankCache {
    /// Create a cache that ranks users with total XP above zero.
    pub fn new() -> Self {
        Self::with_floor(1)
    }

    /// Create a cache that ranks users whose score reaches `floor`.
    ///
    /// Updates below the floor remove the user's entry instead of storing it.
    pub fn with_floor(floor: u64) -> Self {
        Self {
            index: RwLock::new(ScoreIndex::new()),
            floor,
        }
    }
}

impl Default for MemoryRankCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RankCache for MemoryRankCache {
    async fn update(&self, user_id: &UserId, score: u64) -> Result<(), RankCacheError> {
        let mut index = self
            .index
            .write()
            .map_err(|_| RankCacheError::unavailable("rank index lock poisoned"))?;
        if score >= self.floor {
            index.upsert(user_id.clone(), score);
        } else {
            index.remove(user_id);
        }
        Ok(())
    }

    async fn top_k(&self, k: usize) -> Result<Vec<RankEntry>, RankCacheError> {
        let index = self
            .index
            .read()
            .map_err(|_| RankCacheError::unavailable("rank index lock poisoned"))?;
        Ok(index.top(k))
    }

    async fn rank_of(&self, user_id: &UserId) -> Result<Option<u64>, RankCacheError> {
        let index = self
            .index
            .read()
            .map_err(|_| RankCacheError::unavailable("rank index lock poisoned"))?;
        Ok(index.rank_of(user_id))
    }

    async fn score_of(&self, user_id: &UserId) -> Result<Option<u64>, RankCacheError> {
        let index = self
            .index
            .read()
            .map_err(|_| RankCacheError::unavailable("rank index lock poisoned"))?;
        Ok(index.score_of(user_id))
    }
}
