//! In-memory score ledger adapter.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ids::{AttemptId, UserId};
use crate::domain::ports::{LedgerAward, ScoreLedger, ScoreLedgerError};

#[derive(Debug, Default)]
struct LedgerAccount {
    total: u64,
    applied: HashSet<AttemptId>,
}

/// Mutex-backed ledger holding per-user totals and applied attempt ids.
///
/// The idempotency check and the increment happen under one lock, so two
/// concurrent deliveries of the same attempt collapse to one increment and
/// concurrent awards for distinct attempts never lose updates.
#[derive(Default)]
pub struct MemoryScoreLedger {
    accounts: Mutex<HashMap<UserId, LedgerAccount>>,
}

impl MemoryScoreLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<UserId, LedgerAccount>>, ScoreLedgerError> {
        self.accounts
            .lock()
            .map_err(|_| ScoreLedgerError::unavailable("score ledger lock poisoned"))
    }
}

#[async_trait]
impl ScoreLedger for MemoryScoreLedger {
    async fn atomic_award(
        &self,
        user_id: &UserId,
        attempt_id: &AttemptId,
        delta: u32,
    ) -> Result<LedgerAward, ScoreLedgerError> {
        let mut accounts = self.lock()?;
        let account = accounts.entry(user_id.clone()).or_default();
        if account.applied.contains(attempt_id) {
            return Ok(LedgerAward {
                total: account.total,
                newly_applied: false,
            });
        }
        account.applied.insert(attempt_id.clone());
        account.total = account.total.saturating_add(u64::from(delta));
        Ok(LedgerAward {
            total: account.total,
            newly_applied: true,
        })
    }

    async fn total_xp(&self, user_id: &UserId) -> Result<u64, ScoreLedgerError> {
        let accounts = self.lock()?;
        Ok(accounts.get(user_id).map_or(0, |account| account.total))
    }
}
