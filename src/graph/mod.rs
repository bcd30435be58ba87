use std::collections::BTreeMap;

use crate::core::package::{Node, NodeState, PackageId};

pub mod builder;
pub mod ops;
pub mod viz;

/// Package → direct dependencies. Grows only; nodes are never removed.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    nodes: BTreeMap<PackageId, Node>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an unresolved, dependency-free node unless one already exists.
    pub fn ensure_node(&mut self, name: &PackageId) -> &mut Node {
        self.nodes
            .entry(name.clone())
            .or_insert_with(|| Node::unresolved(name.clone()))
    }

    /// Appends `to` to `from`'s dependency list. Repeated calls keep every
    /// occurrence.
    pub fn add_edge(&mut self, from: &PackageId, to: &PackageId) {
        self.ensure_node(to);
        self.ensure_node(from).dependencies.push(to.clone());
    }

    pub fn mark_resolved(&mut self, name: &PackageId) {
        self.ensure_node(name).state = NodeState::Resolved;
    }

    pub fn node(&self, name: &PackageId) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &PackageId) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn dependencies_of(&self, name: &PackageId) -> &[PackageId] {
        self.nodes
            .get(name)
            .map(|node| node.dependencies.as_slice())
            .unwrap_or(&[])
    }

    pub fn unresolved(&self) -> Vec<PackageId> {
        self.nodes
            .values()
            .filter(|node| !node.is_resolved())
            .map(|node| node.name().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|node| node.dependencies.len()).sum()
    }
}
