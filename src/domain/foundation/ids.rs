//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LampId(Uuid);

impl LampId {
    /// Creates a new random LampId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a LampId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for LampId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LampId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LampId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(LampId::new(), LampId::new());
    }

    #[test]
    fn parses_from_valid_uuid_string() {
        let id = LampId::new();
        let parsed: LampId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_malformed_uuid_string() {
        assert!("not-a-uuid".parse::<LampId>().is_err());
    }

    #[test]
    fn ordering_matches_uuid_ordering() {
        let a = LampId::from_uuid(Uuid::from_u128(1));
        let b = LampId::from_uuid(Uuid::from_u128(2));
        assert!(a < b);
    }
}
