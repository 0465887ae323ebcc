//! Cyclic-equivalence grouping.
//!
//! Each file is fingerprinted by its closed dependency set. Files are sorted
//! by `(fan_in desc, fan_out asc, fingerprint asc, id asc)` and consecutive
//! runs with the same fingerprint become one [`CyclicalGroup`].
//!
//! ## Adjacency, not equality
//!
//! Grouping only merges *neighbours* in that order. Two files with identical
//! closed sets but different fan-in sort apart and end up in separate
//! groups; see `equal_fingerprints_split_by_fan_in` below.

#![allow(clippy::module_name_repetitions)]

use std::cmp::Reverse;

use petgraph::graph::NodeIndex;
use tracing::{debug, instrument};

use crate::graph::build::{FileGraph, FileNode};

/// A run of files sharing one fingerprint under the canonical file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclicalGroup {
    pub fan_in: usize,
    pub fan_out: usize,
    pub fingerprint: String,
    pub file_count: usize,
    /// Member files in canonical file order.
    pub files: Vec<NodeIndex>,
}

impl CyclicalGroup {
    /// Sort key: fan-in desc, fan-out asc, file count desc, fingerprint asc.
    #[must_use]
    pub fn order_key(&self) -> (Reverse<usize>, usize, Reverse<usize>, &str) {
        (
            Reverse(self.fan_in),
            self.fan_out,
            Reverse(self.file_count),
            self.fingerprint.as_str(),
        )
    }

    /// `true` when the group holds more than one file.
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        self.file_count > 1
    }
}

/// Result of grouping a closed graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping {
    /// Groups in group order (see [`CyclicalGroup::order_key`]).
    pub groups: Vec<CyclicalGroup>,
    /// File count of the largest group.
    pub core_count: usize,
    /// Total number of files.
    pub file_count: usize,
}

/// Canonical file order key: fan-in desc, fan-out asc, fingerprint asc,
/// id asc.
#[must_use]
pub fn file_order_key(file: &FileNode) -> (Reverse<usize>, usize, &str, &str) {
    (
        Reverse(file.fan_in),
        file.fan_out,
        file.fingerprint.as_str(),
        file.id.as_str(),
    )
}

/// All node indices of `graph` in canonical file order.
#[must_use]
pub fn sorted_files(graph: &FileGraph) -> Vec<NodeIndex> {
    let mut order: Vec<NodeIndex> = graph.graph.node_indices().collect();
    order.sort_by(|a, b| file_order_key(&graph.graph[*a]).cmp(&file_order_key(&graph.graph[*b])));
    order
}

/// Sort groups in place into group order.
pub fn sort_groups(groups: &mut [CyclicalGroup]) {
    groups.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
}

/// Fingerprint every file from its closed `depends_on` set.
///
/// The fingerprint is the BLAKE3 hash of the lexicographically sorted
/// dependency ids joined with `;`.
#[instrument(skip(graph), fields(files = graph.node_count()))]
pub fn assign_fingerprints(graph: &mut FileGraph) {
    let fingerprints: Vec<(NodeIndex, String)> = graph
        .graph
        .node_indices()
        .map(|idx| {
            let ids = graph.ids_of(&graph.graph[idx].depends_on);
            (idx, fingerprint(&ids))
        })
        .collect();

    for (idx, print) in fingerprints {
        graph.graph[idx].fingerprint = print;
    }
}

/// BLAKE3 hex digest of `ids` joined with `;`. Callers pass sorted ids.
#[must_use]
pub fn fingerprint(ids: &[&str]) -> String {
    blake3::hash(ids.join(";").as_bytes()).to_hex().to_string()
}

/// Gather files into cyclic-equivalence groups.
///
/// Requires fan counts and fingerprints to be set.
#[must_use]
#[instrument(skip(graph), fields(files = graph.node_count()))]
pub fn group_files(graph: &FileGraph) -> Grouping {
    let mut groups: Vec<CyclicalGroup> = Vec::new();

    for idx in sorted_files(graph) {
        let file = &graph.graph[idx];
        match groups.last_mut() {
            Some(current) if current.fingerprint == file.fingerprint => {
                current.files.push(idx);
                current.file_count += 1;
            }
            _ => groups.push(CyclicalGroup {
                fan_in: file.fan_in,
                fan_out: file.fan_out,
                fingerprint: file.fingerprint.clone(),
                file_count: 1,
                files: vec![idx],
            }),
        }
    }

    let core_count = groups.iter().map(|g| g.file_count).max().unwrap_or(0);
    sort_groups(&mut groups);

    debug!(
        groups = groups.len(),
        core_count,
        cyclic = groups.iter().filter(|g| g.is_cycle()).count(),
        "grouped files"
    );

    Grouping {
        groups,
        core_count,
        file_count: graph.node_count(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
