//! Cycle-tolerant transitive closure of the "depends on" relation.
//!
//! # Algorithm
//!
//! 1. **Peel**: Kahn's algorithm with a live in-degree counter per node.
//!    Nodes whose counter reaches zero join a ready queue; each dequeued node
//!    is appended to `sorted` and decrements its successors.
//! 2. **Residue**: nodes that still hold incoming edges after the peel sit
//!    on, or downstream of, at least one cycle.
//! 3. **Forward pass**: walk `sorted` in removal order and union each
//!    node's (already complete) dependency set into every direct successor.
//! 4. **Fixed point**: repeatedly scan the residue, unioning along its
//!    outgoing edges, until a full scan inserts nothing. Set union over the
//!    fixed node universe is monotone, so this settles; a path inside the
//!    residue has fewer than `|residue|` edges, which bounds the passes at
//!    `|residue| + 1`. Overrunning that bound is reported, not looped on.
//! 5. **Invert**: fill `depended_on_by` from the closed `depends_on` sets.
//! 6. **Self-loops**: every file depends on, and is depended on by, itself.

use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use petgraph::{Direction, graph::NodeIndex};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::GraphError;
use crate::graph::build::FileGraph;
use crate::graph::stats::check_balance;

/// Bookkeeping from one closure run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClosureStats {
    /// Files removed by the topological peel.
    pub sorted_count: usize,
    /// Files left in the cyclic residue.
    pub residue_count: usize,
    /// Full scans made by the fixed-point relaxation, including the final
    /// scan that made no change.
    pub relaxation_passes: usize,
}

impl ClosureStats {
    /// Upper bound on relaxation passes for this residue size.
    #[must_use]
    pub const fn pass_limit(&self) -> usize {
        self.residue_count + 1
    }
}

/// Close `graph` in place: transitive `depends_on`, exact inverse
/// `depended_on_by`, and the self-loop convention.
///
/// # Errors
///
/// - [`GraphError::RelaxationDiverged`] if the fixed point is not reached
///   within `|residue| + 1` passes.
/// - [`GraphError::FanImbalance`] if the inversion is not exact.
#[instrument(skip(graph), fields(files = graph.node_count()))]
pub fn close(graph: &mut FileGraph) -> Result<ClosureStats, GraphError> {
    let (sorted, residue) = peel(graph);
    debug!(
        sorted = sorted.len(),
        residue = residue.len(),
        "topological peel finished"
    );

    forward_pass(graph, &sorted);
    let relaxation_passes = relax_residue(graph, &residue)?;

    invert(graph);
    check_balance(graph, "inversion")?;
    add_self_loops(graph);

    if !residue.is_empty() {
        info!(
            residue = residue.len(),
            passes = relaxation_passes,
            "resolved cyclic dependencies"
        );
    }

    Ok(ClosureStats {
        sorted_count: sorted.len(),
        residue_count: residue.len(),
        relaxation_passes,
    })
}

/// Kahn peel. Returns `(sorted, residue)`, both as node indices; the residue
/// is in index order.
fn peel(graph: &FileGraph) -> (Vec<NodeIndex>, Vec<NodeIndex>) {
    let g = &graph.graph;
    let mut in_degree: Vec<usize> = g
        .node_indices()
        .map(|idx| g.neighbors_directed(idx, Direction::Incoming).count())
        .collect();

    let mut ready: VecDeque<NodeIndex> = g
        .node_indices()
        .filter(|idx| in_degree[idx.index()] == 0)
        .collect();

    let mut sorted = Vec::with_capacity(g.node_count());
    while let Some(node) = ready.pop_front() {
        sorted.push(node);
        for next in g.neighbors_directed(node, Direction::Outgoing) {
            let remaining = &mut in_degree[next.index()];
            *remaining -= 1;
            if *remaining == 0 {
                ready.push_back(next);
            }
        }
    }

    let residue = g
        .node_indices()
        .filter(|idx| in_degree[idx.index()] > 0)
        .collect();

    (sorted, residue)
}

fn successors(graph: &FileGraph, node: NodeIndex) -> Vec<NodeIndex> {
    graph
        .graph
        .neighbors_directed(node, Direction::Outgoing)
        .collect()
}

/// One pass over the acyclic prefix in topological order.
fn forward_pass(graph: &mut FileGraph, sorted: &[NodeIndex]) {
    for &node in sorted {
        let deps = graph.graph[node].depends_on.clone();
        for next in successors(graph, node) {
            graph.graph[next].depends_on.union_with(&deps);
        }
    }
}

/// Fixed-point relaxation over the cyclic residue. Returns the pass count.
fn relax_residue(graph: &mut FileGraph, residue: &[NodeIndex]) -> Result<usize, GraphError> {
    let limit = residue.len() + 1;
    let edges: Vec<(NodeIndex, Vec<NodeIndex>)> = residue
        .iter()
        .map(|&node| (node, successors(graph, node)))
        .collect();

    let mut passes = 0;
    loop {
        if passes == limit {
            return Err(GraphError::RelaxationDiverged {
                residue: residue.len(),
                limit,
            });
        }
        passes += 1;

        let mut changed = false;
        for (node, nexts) in &edges {
            let deps = graph.graph[*node].depends_on.clone();
            for next in nexts {
                let target = &mut graph.graph[*next].depends_on;
                if !deps.is_subset(target) {
                    target.union_with(&deps);
                    changed = true;
                }
            }
        }

        if !changed {
            return Ok(passes);
        }
    }
}

fn invert(graph: &mut FileGraph) {
    let n = graph.node_count();
    let mut inverse = vec![FixedBitSet::with_capacity(n); n];
    for node in graph.graph.node_indices() {
        for dep in graph.graph[node].depends_on.ones() {
            inverse[dep].insert(node.index());
        }
    }
    for (bit, set) in inverse.into_iter().enumerate() {
        graph.graph[NodeIndex::new(bit)].depended_on_by = set;
    }
}

fn add_self_loops(graph: &mut FileGraph) {
    for node in graph.graph.node_indices() {
        let file = &mut graph.graph[node];
        file.depends_on.insert(node.index());
        file.depended_on_by.insert(node.index());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
