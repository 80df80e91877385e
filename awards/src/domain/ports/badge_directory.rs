//! Port abstraction for badge definition lookups.

use async_trait::async_trait;

use crate::domain::badge::BadgeDefinition;

use super::define_port_error;

define_port_error! {
    /// Errors raised by badge directory adapters.
    pub enum BadgeDirectoryError {
        /// Directory storage is temporarily unreachable.
        Unavailable { message: String } => [transient] "badge directory unavailable: {message}",
    }
}

/// Read-only port over the admin-managed badge definitions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeDirectory: Send + Sync {
    /// Every badge definition currently configured.
    async fn definitions(&self) -> Result<Vec<BadgeDefinition>, BadgeDirectoryError>;
}
