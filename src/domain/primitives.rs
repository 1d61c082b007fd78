//! Domain primitives: CompanyId, ContactId, Actor.

use serde::{Deserialize, Serialize};

/// Surrogate key of a company row. Assigned by the store at insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub i64);

impl CompanyId {
    pub fn new(id: i64) -> Self {
        CompanyId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Surrogate key of a contact row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContactId(pub i64);

impl ContactId {
    pub fn new(id: i64) -> Self {
        ContactId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Principal recorded in `CreatedBy` / `ModifiedBy`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor(pub String);

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Actor(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_numbers() {
        assert_eq!(serde_json::to_string(&CompanyId::new(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&ContactId::new(7)).unwrap(), "7");
    }

    #[test]
    fn test_actor_display() {
        let actor = Actor::new("kyle");
        assert_eq!(actor.to_string(), "kyle");
        assert_eq!(actor.as_str(), "kyle");
    }

    #[test]
    fn test_company_id_ordering() {
        assert!(CompanyId::new(1) < CompanyId::new(2));
    }
}
