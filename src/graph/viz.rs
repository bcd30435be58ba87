use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::core::package::{NodeState, PackageId};
use crate::graph::ops::LoadOrder;
use crate::graph::DependencyGraph;

/// One line per package: `name -> dep1, dep2`.
pub fn render_list(graph: &DependencyGraph) -> String {
    let mut out = String::new();
    for node in graph.nodes() {
        out.push_str(node.name().as_str());
        out.push_str(" -> ");
        if node.dependencies.is_empty() {
            out.push_str(if node.is_resolved() {
                "(no dependencies)"
            } else {
                "(not fetched)"
            });
        } else {
            out.push_str(&join(&node.dependencies, ", "));
        }
        out.push('\n');
    }
    out
}

pub fn render_tree(graph: &DependencyGraph, root: &PackageId) -> String {
    let mut out = String::new();
    out.push_str(root.as_str());
    out.push('\n');
    let mut path = vec![root.clone()];
    let mut expanded = HashSet::from([root.clone()]);
    render_tree_children(root, graph, "", &mut path, &mut expanded, &mut out);
    out
}

fn render_tree_children(
    node: &PackageId,
    graph: &DependencyGraph,
    prefix: &str,
    path: &mut Vec<PackageId>,
    expanded: &mut HashSet<PackageId>,
    out: &mut String,
) {
    let children = graph.dependencies_of(node);
    for (idx, child) in children.iter().enumerate() {
        let is_last = idx + 1 == children.len();
        out.push_str(prefix);
        out.push_str(if is_last { "`-- " } else { "|-- " });
        out.push_str(child.as_str());
        if path.iter().any(|id| id == child) {
            out.push_str(" (cycle)");
            out.push('\n');
            continue;
        }
        // Subtrees already printed once are not repeated.
        if !graph.dependencies_of(child).is_empty() && !expanded.insert(child.clone()) {
            out.push_str(" (seen)");
            out.push('\n');
            continue;
        }
        out.push('\n');
        path.push(child.clone());
        let mut next_prefix = prefix.to_string();
        if is_last {
            next_prefix.push_str("    ");
        } else {
            next_prefix.push_str("|   ");
        }
        render_tree_children(child, graph, &next_prefix, path, expanded, out);
        path.pop();
    }
}

pub fn render_dot(graph: &DependencyGraph) -> String {
    let mut out = String::from("digraph depviz {\n");
    for node in graph.nodes() {
        let style = if node.is_resolved() { "" } else { ", style=dashed" };
        out.push_str(&format!(
            "  \"{}\" [label=\"{}\"{}];\n",
            escape_dot_label(node.name().as_str()),
            escape_dot_label(node.name().as_str()),
            style
        ));
    }
    for node in graph.nodes() {
        for dep in &node.dependencies {
            out.push_str(&format!(
                "  \"{}\" -> \"{}\";\n",
                escape_dot_label(node.name().as_str()),
                escape_dot_label(dep.as_str())
            ));
        }
    }
    out.push_str("}\n");
    out
}

/// Dependencies first, e.g. `D -> B -> C -> A`.
pub fn render_order(order: &[PackageId]) -> String {
    join(order, " -> ")
}

pub fn render_cycle_warning(members: &BTreeSet<PackageId>, path: &[PackageId]) -> String {
    let members: Vec<&str> = members.iter().map(PackageId::as_str).collect();
    let mut out = format!("dependency cycle detected among: {}", members.join(", "));
    if !path.is_empty() {
        out.push_str(&format!("\n  e.g. {}", join(path, " -> ")));
    }
    out
}

#[derive(Serialize)]
struct GraphJson<'a> {
    nodes: Vec<GraphNode<'a>>,
    edges: Vec<GraphEdge<'a>>,
}

#[derive(Serialize)]
struct GraphNode<'a> {
    id: &'a PackageId,
    state: NodeState,
    dependencies: &'a [PackageId],
}

#[derive(Serialize)]
struct GraphEdge<'a> {
    from: &'a PackageId,
    to: &'a PackageId,
}

pub fn render_json(graph: &DependencyGraph) -> serde_json::Result<String> {
    let nodes = graph
        .nodes()
        .map(|node| GraphNode {
            id: node.name(),
            state: node.state,
            dependencies: &node.dependencies,
        })
        .collect();
    let edges = graph
        .nodes()
        .flat_map(|node| {
            node.dependencies.iter().map(move |dep| GraphEdge {
                from: node.name(),
                to: dep,
            })
        })
        .collect();
    serde_json::to_string_pretty(&GraphJson { nodes, edges })
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum OrderJson<'a> {
    Ordered {
        order: &'a [PackageId],
    },
    Cycle {
        members: &'a BTreeSet<PackageId>,
        path: &'a [PackageId],
    },
}

pub fn render_order_json(result: &LoadOrder) -> serde_json::Result<String> {
    let json = match result {
        LoadOrder::Ordered(order) => OrderJson::Ordered { order },
        LoadOrder::Cycle(report) => OrderJson::Cycle {
            members: &report.members,
            path: &report.path,
        },
    };
    serde_json::to_string_pretty(&json)
}

fn join(ids: &[PackageId], separator: &str) -> String {
    ids.iter()
        .map(PackageId::as_str)
        .collect::<Vec<_>>()
        .join(separator)
}

fn escape_dot_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
