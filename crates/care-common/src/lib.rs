//! Shared primitives for the OpenCare portal
//!
//! Value objects and error types used by every other crate in the
//! workspace: entity identifiers, the authenticated `Principal`, and the
//! error taxonomy shared between the domain crates and the portal API.

pub mod error;
pub mod principal;

pub use error::RepositoryError;
pub use principal::{Principal, Role};

/// Identifier value object for entities
///
/// String-backed so ids supplied by the document store round-trip without
/// re-encoding.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct EntityId(String);

impl EntityId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_unique() {
        assert_ne!(EntityId::new(), EntityId::new());
    }

    #[test]
    fn test_entity_id_round_trip() {
        let id = EntityId::from_string("doc-42");
        assert_eq!(id.as_str(), "doc-42");
        assert_eq!(id.to_string(), "doc-42");
    }
}
