//! Resource identifiers.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Length of the canonical hyphenated form.
const CANONICAL_LEN: usize = 36;

/// Rejected identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid identifier")]
pub struct IdentityError(pub String);

/// A resource id in canonical UUID shape (`8-4-4-4-12` hex digits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity(Uuid);

impl Identity {
    /// Parse an id taken from a path segment or a request body.
    ///
    /// Only the hyphenated form is accepted. Braced, URN and simple forms are
    /// rejected even though they name a valid UUID.
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        if raw.len() != CANONICAL_LEN {
            return Err(IdentityError(raw.to_string()));
        }
        Uuid::try_parse(raw)
            .map(Identity)
            .map_err(|_| IdentityError(raw.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl From<Uuid> for Identity {
    fn from(uuid: Uuid) -> Self {
        Identity(uuid)
    }
}
