//! Identifier newtypes shared across the RAMP wire model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Database identifier of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identifier of a backlog epic.
///
/// Epic ids are minted by the backlog service and treated as opaque
/// strings on this side of the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpicId(pub String);

impl fmt::Display for EpicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EpicId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for EpicId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl EpicId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Database identifier of a delivery team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub i64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TeamId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epic_id_display() {
        let id = EpicId::from("EPIC-42");
        assert_eq!(id.to_string(), "EPIC-42");
        assert_eq!(id.as_str(), "EPIC-42");
    }

    #[test]
    fn test_ids_serialize_transparent() {
        let product = ProductId(7);
        assert_eq!(serde_json::to_string(&product).unwrap(), "7");

        let epic = EpicId::from("EPIC-1");
        assert_eq!(serde_json::to_string(&epic).unwrap(), "\"EPIC-1\"");

        let team: TeamId = serde_json::from_str("3").unwrap();
        assert_eq!(team, TeamId(3));
    }
}
