//! Validated entity identifier newtypes.
//!
//! Every identifier is a UUID carried alongside its canonical string form so
//! adapters can borrow either representation without re-formatting. The
//! newtypes keep user, challenge, attempt, badge, and award references from
//! being mixed up at compile time.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors shared by all identifier newtypes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityIdError {
    /// The identifier string was empty.
    Empty,
    /// The identifier string was not a valid UUID.
    Invalid,
}

impl fmt::Display for EntityIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "identifier must not be empty"),
            Self::Invalid => write!(f, "identifier must be a valid UUID"),
        }
    }
}

impl std::error::Error for EntityIdError {}

macro_rules! define_entity_id {
    (
        $(#[$outer:meta])*
        $name:ident
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid, String);

        impl $name {
            /// Validate and construct an identifier from borrowed input.
            pub fn new(id: impl AsRef<str>) -> Result<Self, EntityIdError> {
                Self::from_owned(id.as_ref().to_owned())
            }

            /// Construct an identifier from an already-validated UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                let raw = uuid.to_string();
                Self(uuid, raw)
            }

            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self::from_uuid(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            fn from_owned(id: String) -> Result<Self, EntityIdError> {
                if id.is_empty() {
                    return Err(EntityIdError::Empty);
                }
                if id.trim() != id {
                    return Err(EntityIdError::Invalid);
                }
                let parsed = Uuid::parse_str(&id).map_err(|_| EntityIdError::Invalid)?;
                Ok(Self(parsed, id))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.1.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_ref())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.1
            }
        }

        impl TryFrom<String> for $name {
            type Error = EntityIdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::from_owned(value)
            }
        }
    };
}

define_entity_id! {
    /// Stable user identifier.
    UserId
}

define_entity_id! {
    /// Stable challenge identifier.
    ChallengeId
}

define_entity_id! {
    /// Stable attempt identifier; doubles as the award idempotency key.
    AttemptId
}

define_entity_id! {
    /// Stable badge definition identifier.
    BadgeId
}

define_entity_id! {
    /// Stable identifier of one badge award record.
    AwardId
}
