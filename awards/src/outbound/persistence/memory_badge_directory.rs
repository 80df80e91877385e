//! In-memory badge directory adapter.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::badge::BadgeDefinition;
use crate::domain::ports::{BadgeDirectory, BadgeDirectoryError};

/// Mutex-backed badge definition list.
#[derive(Default)]
pub struct MemoryBadgeDirectory {
    definitions: Mutex<Vec<BadgeDefinition>>,
}

impl MemoryBadgeDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a badge definition.
    pub fn publish(&self, definition: BadgeDefinition) -> Result<(), BadgeDirectoryError> {
        let mut definitions = self
            .definitions
            .lock()
            .map_err(|_| BadgeDirectoryError::unavailable("badge directory lock poisoned"))?;
        definitions.push(definition);
        Ok(())
    }
}

#[async_trait]
impl BadgeDirectory for MemoryBadgeDirectory {
    async fn definitions(&self) -> Result<Vec<BadgeDefinition>, BadgeDirectoryError> {
        let definitions = self
            .definitions
            .lock()
            .map_err(|_| BadgeDirectoryError::unavailable("badge directory lock poisoned"))?;
        Ok(definitions.clone())
    }
}
