use std::collections::{HashSet, VecDeque};

use tracing::{debug, info, warn};

use crate::core::package::{NodeState, PackageId};
use crate::graph::DependencyGraph;
use crate::source::{DependencySource, SourceError};

/// What `build_from_source` does when the supplier fails for one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Stop asking the supplier and return the first error.
    #[default]
    Abort,
    /// Log the failure and treat the package as having no dependencies.
    TreatAsLeaf,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub fetched: Vec<PackageId>,
    pub failures: Vec<(PackageId, SourceError)>,
}

/// Breadth-first walk from `start`. `fetch` is called exactly once per
/// distinct package; every returned dependency becomes an edge.
pub fn build<F>(graph: &mut DependencyGraph, start: &PackageId, mut fetch: F)
where
    F: FnMut(&PackageId) -> Vec<PackageId>,
{
    let mut visited: HashSet<PackageId> = HashSet::new();
    let mut queue: VecDeque<PackageId> = VecDeque::from([start.clone()]);

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current.clone()) {
            continue;
        }
        graph.mark_resolved(&current);

        let deps = fetch(&current);
        debug!(package = %current, count = deps.len(), "fetched dependencies");
        for dep in deps {
            graph.add_edge(&current, &dep);
            if !visited.contains(&dep) {
                queue.push_back(dep);
            }
        }
    }
}

pub fn build_from_source<S>(
    graph: &mut DependencyGraph,
    start: &PackageId,
    source: &mut S,
    policy: FetchPolicy,
) -> Result<BuildReport, SourceError>
where
    S: DependencySource + ?Sized,
{
    let mut report = BuildReport::default();
    let mut aborted: Option<SourceError> = None;

    build(graph, start, |package| {
        if aborted.is_some() {
            return Vec::new();
        }
        match source.dependencies(package) {
            Ok(deps) => {
                report.fetched.push(package.clone());
                deps
            }
            Err(err) => match policy {
                FetchPolicy::Abort => {
                    aborted = Some(err);
                    Vec::new()
                }
                FetchPolicy::TreatAsLeaf => {
                    warn!(package = %package, error = %err, "treating package as dependency-free");
                    report.failures.push((package.clone(), err));
                    Vec::new()
                }
            },
        }
    });

    // Only a successful lookup makes a node resolved.
    let fetched: HashSet<&PackageId> = report.fetched.iter().collect();
    let skipped: Vec<PackageId> = graph
        .nodes()
        .filter(|node| node.is_resolved() && !fetched.contains(node.name()))
        .map(|node| node.name().clone())
        .collect();
    for package in &skipped {
        graph.ensure_node(package).state = NodeState::Unresolved;
    }

    if let Some(err) = aborted {
        return Err(err);
    }
    info!(
        packages = graph.len(),
        edges = graph.edge_count(),
        failures = report.failures.len(),
        "dependency graph built"
    );
    Ok(report)
}
