use std::fmt;

use serde::Serialize;

/// Case-sensitive package identifier. Ordered lexicographically so every
/// traversal that needs a tie-break gets the same answer on every run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PackageId(String);

impl PackageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PackageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// The supplier was asked for this package's dependencies.
    Resolved,
    /// Only referenced as a dependency target; never looked up.
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: PackageId,
    pub dependencies: Vec<PackageId>,
    pub state: NodeState,
}

impl Node {
    pub fn unresolved(name: PackageId) -> Self {
        Self {
            name,
            dependencies: Vec::new(),
            state: NodeState::Unresolved,
        }
    }

    pub fn name(&self) -> &PackageId {
        &self.name
    }

    pub fn is_resolved(&self) -> bool {
        self.state == NodeState::Resolved
    }
}

#[cfg(test)]
mod tests {
    use crate::core::package::{Node, NodeState, PackageId};

    #[test]
    fn package_ids_are_case_sensitive() {
        assert_ne!(PackageId::new("Newtonsoft.Json"), PackageId::new("newtonsoft.json"));
    }

    #[test]
    fn package_ids_order_lexicographically() {
        let mut ids = vec![PackageId::from("b"), PackageId::from("B"), PackageId::from("a")];
        ids.sort();
        assert_eq!(ids, vec![PackageId::from("B"), PackageId::from("a"), PackageId::from("b")]);
    }

    #[test]
    fn new_nodes_start_unresolved() {
        let node = Node::unresolved(PackageId::from("left-pad"));
        assert_eq!(node.state, NodeState::Unresolved);
        assert!(node.dependencies.is_empty());
        assert!(!node.is_resolved());
        assert_eq!(node.name().as_str(), "left-pad");
    }
}
