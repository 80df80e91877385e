//! Port abstraction for the read-optimised rank cache.

use async_trait::async_trait;

use crate::domain::ids::UserId;
use crate::domain::leaderboard::RankEntry;

use super::define_port_error;

define_port_error! {
    /// Errors raised by rank cache adapters.
    pub enum RankCacheError {
        /// Cache storage is temporarily unreachable.
        Unavailable { message: String } => [transient] "rank cache unavailable: {message}",
    }
}

/// Port over the ordered (user, score) projection.
///
/// The cache stores the ledger's current total, never a delta, so writes are
/// idempotent under redelivery. Only pipeline workers write; read-path
/// queries share the structure without further locking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RankCache: Send + Sync {
    /// Upsert the user's score with overwrite semantics.
    async fn update(&self, user_id: &UserId, score: u64) -> Result<(), RankCacheError>;

    /// Up to `k` best entries in descending score order, ties by ascending
    /// user id.
    async fn top_k(&self, k: usize) -> Result<Vec<RankEntry>, RankCacheError>;

    /// 1-based descending rank, or `None` when the user has no entry.
    async fn rank_of(&self, user_id: &UserId) -> Result<Option<u64>, RankCacheError>;

    /// Score held for the user, or `None` when the user has no entry.
    async fn score_of(&self, user_id: &UserId) -> Result<Option<u64>, RankCacheError>;
}
