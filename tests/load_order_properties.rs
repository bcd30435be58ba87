use std::collections::{BTreeSet, HashMap};

use depviz::core::PackageId;
use depviz::graph::builder::build;
use depviz::graph::ops::{load_order, reachable, LoadOrder};
use depviz::graph::DependencyGraph;

/// Small deterministic generator so every run checks the same graphs.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

fn name(idx: u64) -> PackageId {
    PackageId::new(format!("pkg{idx:02}"))
}

/// Edges only point from a higher index to a lower one, so the result is
/// acyclic. Duplicate edges are allowed.
fn random_dag(rng: &mut Lcg, size: u64) -> HashMap<PackageId, Vec<PackageId>> {
    let mut repo = HashMap::new();
    for from in 0..size {
        let mut deps = Vec::new();
        if from > 0 {
            for _ in 0..rng.below(4) {
                deps.push(name(rng.below(from)));
            }
        }
        repo.insert(name(from), deps);
    }
    repo
}

fn build_from(repo: &HashMap<PackageId, Vec<PackageId>>, start: &PackageId) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    build(&mut graph, start, |package| {
        repo.get(package).cloned().unwrap_or_default()
    });
    graph
}

#[test]
fn acyclic_graphs_yield_dependency_first_permutation_of_reachable_set() {
    let mut rng = Lcg(7);
    for round in 0..200 {
        let size = 1 + rng.below(15);
        let repo = random_dag(&mut rng, size);
        let start = name(rng.below(size));
        let mut graph = build_from(&repo, &start);

        let expected: BTreeSet<PackageId> = reachable(&mut graph, &start);
        let order = match load_order(&mut graph, &start) {
            LoadOrder::Ordered(order) => order,
            LoadOrder::Cycle(report) => panic!("round {round}: unexpected cycle {report:?}"),
        };

        let emitted: BTreeSet<PackageId> = order.iter().cloned().collect();
        assert_eq!(emitted.len(), order.len(), "round {round}: duplicates in {order:?}");
        assert_eq!(emitted, expected, "round {round}");

        let position: HashMap<&PackageId, usize> =
            order.iter().enumerate().map(|(idx, id)| (id, idx)).collect();
        for parent in &order {
            for child in graph.dependencies_of(parent) {
                assert!(
                    position[child] < position[parent],
                    "round {round}: {child} must precede {parent}"
                );
            }
        }
    }
}

#[test]
fn fully_cyclic_graphs_report_every_reachable_package() {
    let mut rng = Lcg(11);
    for round in 0..100 {
        let size = 1 + rng.below(10);
        let mut repo = random_dag(&mut rng, size);
        // Close a ring through every package so each one sits on a cycle.
        for idx in 0..size {
            let next = name((idx + 1) % size);
            repo.entry(name(idx)).or_default().push(next);
        }
        let start = name(rng.below(size));
        let mut graph = build_from(&repo, &start);

        let expected = reachable(&mut graph, &start);
        match load_order(&mut graph, &start) {
            LoadOrder::Ordered(order) => panic!("round {round}: expected cycle, got {order:?}"),
            LoadOrder::Cycle(report) => {
                assert_eq!(report.members, expected, "round {round}");
                assert!(report.path.len() >= 2, "round {round}: {:?}", report.path);
                assert_eq!(report.path.first(), report.path.last());
            }
        }
    }
}

#[test]
fn rebuilding_preserves_edge_multiset() {
    let mut rng = Lcg(3);
    for _ in 0..50 {
        let size = 2 + rng.below(12);
        let repo = random_dag(&mut rng, size);
        let start = name(size - 1);
        let first = build_from(&repo, &start);
        let second = build_from(&repo, &start);

        assert_eq!(first.len(), second.len());
        assert_eq!(first.edge_count(), second.edge_count());
        for node in first.nodes() {
            assert_eq!(node.dependencies, second.dependencies_of(node.name()));
        }
    }
}

#[test]
fn dependency_only_targets_are_reachable_leaves() {
    let mut graph = DependencyGraph::new();
    build(&mut graph, &PackageId::from("app"), |package| {
        if package.as_str() == "app" {
            vec![PackageId::from("lib")]
        } else {
            Vec::new()
        }
    });
    // Edge added by hand to a package the supplier never saw.
    graph.add_edge(&PackageId::from("lib"), &PackageId::from("vendored"));

    let set = reachable(&mut graph, &PackageId::from("app"));
    assert!(set.contains(&PackageId::from("vendored")));
    let vendored = graph.node(&PackageId::from("vendored")).expect("vendored node");
    assert!(vendored.dependencies.is_empty());
    assert!(!vendored.is_resolved());
}
