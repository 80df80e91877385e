//! Port abstraction for the authoritative score ledger.

use async_trait::async_trait;

use crate::domain::ids::{AttemptId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by score ledger adapters.
    pub enum ScoreLedgerError {
        /// Ledger storage is temporarily unreachable.
        Unavailable { message: String } => [transient] "score ledger unavailable: {message}",
    }
}

/// Result of one ledger award application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerAward {
    /// The user's cumulative XP after the call.
    pub total: u64,
    /// False when the attempt id had already been applied and the call was a
    /// replay no-op.
    pub newly_applied: bool,
}

/// Port for the durable, authoritative per-user XP totals.
///
/// The award operation is the engine's single mutation point for totals.
/// Implementations must make the idempotency check and the increment one
/// atomic operation (a conditional update, `INSERT ... ON CONFLICT`, or an
/// equivalent compare-and-set), never separate read-then-write steps; two
/// concurrent deliveries of the same attempt must collapse to one increment.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreLedger: Send + Sync {
    /// Atomically add `delta` to the user's total unless `attempt_id` was
    /// already applied; returns the resulting total either way.
    async fn atomic_award(
        &self,
        user_id: &UserId,
        attempt_id: &AttemptId,
        delta: u32,
    ) -> Result<LedgerAward, ScoreLedgerError>;

    /// Current cumulative XP for the user (0 when unknown).
    async fn total_xp(&self, user_id: &UserId) -> Result<u64, ScoreLedgerError>;
}
