use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::core::package::PackageId;
use crate::graph::DependencyGraph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Reachable packages whose dependencies could never all be emitted.
    pub members: BTreeSet<PackageId>,
    /// One concrete cycle, first node repeated at the end.
    pub path: Vec<PackageId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOrder {
    /// Every dependency appears before each package depending on it.
    Ordered(Vec<PackageId>),
    Cycle(CycleReport),
}

impl LoadOrder {
    pub fn order(&self) -> Option<&[PackageId]> {
        match self {
            LoadOrder::Ordered(order) => Some(order),
            LoadOrder::Cycle(_) => None,
        }
    }

    pub fn cycle(&self) -> Option<&CycleReport> {
        match self {
            LoadOrder::Ordered(_) => None,
            LoadOrder::Cycle(report) => Some(report),
        }
    }
}

/// Packages transitively required by `start`, `start` included. Targets
/// that were never inserted get an unresolved placeholder node.
pub fn reachable(graph: &mut DependencyGraph, start: &PackageId) -> BTreeSet<PackageId> {
    let mut seen = BTreeSet::new();
    let mut stack = vec![start.clone()];
    while let Some(current) = stack.pop() {
        if seen.contains(&current) {
            continue;
        }
        let node = graph.ensure_node(&current);
        for dep in &node.dependencies {
            if !seen.contains(dep) {
                stack.push(dep.clone());
            }
        }
        seen.insert(current);
    }
    seen
}

/// Kahn's algorithm over the subgraph reachable from `start`, run on the
/// reverse relation so leaves come out first. Ties go to the smallest
/// identifier.
pub fn load_order(graph: &mut DependencyGraph, start: &PackageId) -> LoadOrder {
    let nodes = reachable(graph, start);

    let mut indegree: BTreeMap<PackageId, usize> =
        nodes.iter().map(|node| (node.clone(), 0)).collect();
    let mut reverse: HashMap<PackageId, Vec<PackageId>> = HashMap::new();
    for parent in &nodes {
        for child in graph.dependencies_of(parent) {
            if !nodes.contains(child) {
                continue;
            }
            reverse.entry(child.clone()).or_default().push(parent.clone());
            if let Some(count) = indegree.get_mut(parent) {
                *count += 1;
            }
        }
    }

    let mut ready: BTreeSet<PackageId> = indegree
        .iter()
        .filter_map(|(node, &count)| (count == 0).then(|| node.clone()))
        .collect();
    let mut order = Vec::with_capacity(nodes.len());

    while let Some(node) = ready.pop_first() {
        if let Some(parents) = reverse.get(&node) {
            for parent in parents {
                if let Some(count) = indegree.get_mut(parent) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(parent.clone());
                    }
                }
            }
        }
        order.push(node);
    }

    if order.len() == nodes.len() {
        return LoadOrder::Ordered(order);
    }

    let members: BTreeSet<PackageId> = indegree
        .into_iter()
        .filter_map(|(node, count)| (count > 0).then_some(node))
        .collect();
    let path = find_cycle(graph, start).unwrap_or_default();
    LoadOrder::Cycle(CycleReport { members, path })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Visiting,
    Visited,
}

/// Depth-first search for one back-edge reachable from `start`. Returns the
/// path from the recurring package around to itself, e.g. `[a, b, a]`.
pub fn find_cycle(graph: &DependencyGraph, start: &PackageId) -> Option<Vec<PackageId>> {
    let mut state: HashMap<PackageId, VisitState> = HashMap::new();
    let mut stack: Vec<PackageId> = Vec::new();
    visit_node(start, graph, &mut state, &mut stack)
}

fn visit_node(
    node: &PackageId,
    graph: &DependencyGraph,
    state: &mut HashMap<PackageId, VisitState>,
    stack: &mut Vec<PackageId>,
) -> Option<Vec<PackageId>> {
    match state.get(node) {
        Some(VisitState::Visiting) => {
            let pos = stack.iter().position(|id| id == node)?;
            let mut cycle = stack[pos..].to_vec();
            cycle.push(node.clone());
            return Some(cycle);
        }
        Some(VisitState::Visited) => return None,
        None => {}
    }

    state.insert(node.clone(), VisitState::Visiting);
    stack.push(node.clone());
    for dep in graph.dependencies_of(node) {
        if let Some(cycle) = visit_node(dep, graph, state, stack) {
            return Some(cycle);
        }
    }
    stack.pop();
    state.insert(node.clone(), VisitState::Visited);
    None
}
