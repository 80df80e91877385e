//! In-memory award log adapter.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::badge::AwardedBadge;
use crate::domain::ids::{BadgeId, UserId};
use crate::domain::ports::{AwardLog, AwardLogError};

type AwardKey = (UserId, BadgeId);

/// Mutex-backed award records, unique on (user, badge).
///
/// The conditional insert checks and writes under one lock, mirroring the
/// unique-constraint insert a database adapter would use.
#[derive(Default)]
pub struct MemoryAwardLog {
    awards: Mutex<HashMap<AwardKey, AwardedBadge>>,
}

impl MemoryAwardLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<AwardKey, AwardedBadge>>, AwardLogError> {
        self.awards
            .lock()
            .map_err(|_| AwardLogError::unavailable("award log lock poisoned"))
    }
}

#[async_trait]
impl AwardLog for MemoryAwardLog {
    async fn insert_if_absent(&self, award: &AwardedBadge) -> Result<bool, AwardLogError> {
        let mut awards = self.lock()?;
        let key = (award.user_id.clone(), award.badge_id.clone());
        if awards.contains_key(&key) {
            return Ok(false);
        }
        awards.insert(key, award.clone());
        Ok(true)
    }

    async fn earned_badge_ids(&self, user_id: &UserId) -> Result<HashSet<BadgeId>, AwardLogError> {
        let awards = self.lock()?;
        Ok(awards
            .keys()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, badge_id)| badge_id.clone())
            .collect())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<AwardedBadge>, AwardLogError> {
        let awards = self.lock()?;
        let mut rows: Vec<AwardedBadge> = awards
            .values()
            .filter(|award| award.user_id == *user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.awarded_at
                .cmp(&b.awarded_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(rows)
    }
}
