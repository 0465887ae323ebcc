use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tangle_core::graph::{FileGraph, close, compute_visibility};
use tangle_core::{Analysis, EdgeMap, ViewMode};

use generators::*;

/// Reflexive-transitive reachability over the raw "depends on" edges.
fn reference_closure(edges: &EdgeMap) -> BTreeMap<String, BTreeSet<String>> {
    edges
        .keys()
        .map(|start| {
            let mut seen = BTreeSet::from([start.clone()]);
            let mut stack = vec![start.clone()];
            while let Some(file) = stack.pop() {
                for dep in &edges[&file] {
                    if seen.insert(dep.clone()) {
                        stack.push(dep.clone());
                    }
                }
            }
            (start.clone(), seen)
        })
        .collect()
}

fn closed(edges: &EdgeMap) -> FileGraph {
    let mut graph = FileGraph::from_edges(edges).expect("generated edges are valid");
    close(&mut graph).expect("closure");
    compute_visibility(&mut graph).expect("visibility");
    graph
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn closure_matches_reachability(edges in arb_edges(24)) {
        let graph = closed(&edges);
        for (file, expected) in reference_closure(&edges) {
            let actual: BTreeSet<String> = graph
                .depends_on(&file)
                .expect("known file")
                .into_iter()
                .map(str::to_string)
                .collect();
            prop_assert_eq!(actual, expected, "closure of {}", file);
        }
    }

    #[test]
    fn closure_is_transitive(edges in arb_edges(24)) {
        let graph = closed(&edges);
        for file in graph.files() {
            for dep in file.depends_on.ones() {
                let inner = &graph.graph[petgraph::graph::NodeIndex::new(dep)].depends_on;
                prop_assert!(inner.is_subset(&file.depends_on), "{} not closed", file.id);
            }
        }
    }

    #[test]
    fn every_file_sees_itself(edges in arb_edges(24)) {
        let graph = closed(&edges);
        for (idx, file) in graph.graph.node_indices().zip(graph.files()) {
            prop_assert!(file.depends_on.contains(idx.index()));
            prop_assert!(file.depended_on_by.contains(idx.index()));
        }
    }

    #[test]
    fn inverse_is_exact_and_balanced(edges in arb_edges(24)) {
        let graph = closed(&edges);
        for a in graph.graph.node_indices() {
            for b in graph.graph.node_indices() {
                prop_assert_eq!(
                    graph.graph[a].depends_on.contains(b.index()),
                    graph.graph[b].depended_on_by.contains(a.index())
                );
            }
        }
        let fan_in: usize = graph.files().map(|f| f.fan_in).sum();
        let fan_out: usize = graph.files().map(|f| f.fan_out).sum();
        prop_assert_eq!(fan_in, fan_out);
    }

    #[test]
    fn relaxation_stays_within_bound(edges in arb_edges(32)) {
        let mut graph = FileGraph::from_edges(&edges).expect("valid");
        let stats = close(&mut graph).expect("closure");
        prop_assert!(stats.relaxation_passes >= 1);
        prop_assert!(stats.relaxation_passes <= stats.pass_limit());
        prop_assert_eq!(stats.sorted_count + stats.residue_count, edges.len());
    }

    #[test]
    fn acyclic_input_has_no_residue(edges in arb_dag(24)) {
        let mut graph = FileGraph::from_edges(&edges).expect("valid");
        let stats = close(&mut graph).expect("closure");
        prop_assert_eq!(stats.residue_count, 0);
        prop_assert_eq!(stats.relaxation_passes, 1);
    }

    #[test]
    fn display_indices_are_contiguous(edges in arb_edges(24), median in any::<bool>()) {
        let view = if median { ViewMode::Median } else { ViewMode::CorePeriphery };
        let analysis = Analysis::run(&edges, view).expect("analysis");

        let mut indices: Vec<usize> = analysis
            .graph
            .files()
            .map(|f| f.display_index.expect("every file is placed"))
            .collect();
        indices.sort_unstable();
        prop_assert_eq!(indices, (0..edges.len()).collect::<Vec<_>>());

        let placed: usize = analysis.partitions.iter().map(|p| p.file_count).sum();
        prop_assert_eq!(placed, edges.len());

        for partition in analysis.partitions.iter().filter(|p| p.file_count > 0) {
            let mut files = partition.files();
            let first = files.next().expect("non-empty partition");
            let first_index = analysis.graph.graph[first].display_index.expect("placed");
            prop_assert!(partition.highest_index + 1 - first_index == partition.file_count);
        }
    }

    #[test]
    fn cyclic_peers_share_a_group(edges in arb_edges(24)) {
        let analysis = Analysis::run(&edges, ViewMode::CorePeriphery).expect("analysis");
        let graph = &analysis.graph;
        for group in analysis.partitions.iter().flat_map(|p| p.groups.iter()) {
            for pair in group.files.windows(2) {
                prop_assert_eq!(&graph.graph[pair[0]].depends_on, &graph.graph[pair[1]].depends_on);
            }
        }
        let largest = analysis
            .partitions
            .iter()
            .flat_map(|p| p.groups.iter())
            .map(|g| g.file_count)
            .max()
            .unwrap_or(0);
        prop_assert_eq!(largest, analysis.core_count);
    }

    #[test]
    fn analysis_is_deterministic(edges in arb_edges(16)) {
        let first = Analysis::run(&edges, ViewMode::CorePeriphery).expect("analysis").report(true);
        let second = Analysis::run(&edges, ViewMode::CorePeriphery).expect("analysis").report(true);
        prop_assert_eq!(first, second);
    }
}
