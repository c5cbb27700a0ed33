//! Strongly-typed identifiers for rangemaster

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Bus address of a physical target node
///
/// Ordered so that command batches come out in ascending node order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Identifier of an exercise definition (stable across runs)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExerciseId(String);

impl ExerciseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ExerciseId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ExerciseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for one run of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_order_numerically() {
        let mut ids = vec![NodeId::new(12), NodeId::new(3), NodeId::new(7)];
        ids.sort();
        assert_eq!(ids, vec![NodeId::new(3), NodeId::new(7), NodeId::new(12)]);
    }

    #[test]
    fn run_id_uniqueness() {
        let r1 = RunId::new();
        let r2 = RunId::new();
        assert_ne!(r1, r2);
    }

    #[test]
    fn node_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&NodeId::new(5)).unwrap();
        assert_eq!(json, "5");

        let parsed: NodeId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, NodeId::new(42));
    }
}
