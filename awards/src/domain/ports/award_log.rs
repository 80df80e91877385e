//! Port abstraction for persisted badge awards.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::badge::AwardedBadge;
use crate::domain::ids::{BadgeId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by award log adapters.
    pub enum AwardLogError {
        /// Award storage is temporarily unreachable.
        Unavailable { message: String } => [transient] "award log unavailable: {message}",
    }
}

/// Port for the (user, badge) award records.
///
/// The insert is conditional on the pair not existing yet; that uniqueness
/// guarantee is what lets the rule engine re-run safely after a partial
/// failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AwardLog: Send + Sync {
    /// Insert the award unless the (user, badge) pair already exists.
    ///
    /// Returns `true` when the record was created and `false` on the
    /// already-awarded no-op.
    async fn insert_if_absent(&self, award: &AwardedBadge) -> Result<bool, AwardLogError>;

    /// Ids of every badge the user has already earned.
    async fn earned_badge_ids(&self, user_id: &UserId) -> Result<HashSet<BadgeId>, AwardLogError>;

    /// All award records for the user, oldest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<AwardedBadge>, AwardLogError>;
}
