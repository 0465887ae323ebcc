//! Graph construction from raw per-file edges.
//!
//! # Overview
//!
//! The symbol-resolution front end hands over an [`EdgeMap`]: for every file,
//! the set of files it directly references. This module turns that mapping
//! into a [`FileGraph`], the single authoritative arena of [`FileNode`]s for
//! the rest of the pipeline.
//!
//! ## Edge Direction
//!
//! An edge `B → A` in the graph means "A **depends on** B". Dependencies sit
//! upstream of their dependents, so a topological walk visits a file only
//! after everything it depends on.
//!
//! ## Node Sets
//!
//! Per-node dependency sets are [`FixedBitSet`]s over node indices. The node
//! set is fixed once the graph is built, so every set has the same capacity
//! and cross-references are index lookups into the arena.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet, HashMap};

use fixedbitset::FixedBitSet;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::instrument;

use crate::error::GraphError;

/// Raw input: file id → ids of the files it directly references.
pub type EdgeMap = BTreeMap<String, BTreeSet<String>>;

// ---------------------------------------------------------------------------
// FileNode
// ---------------------------------------------------------------------------

/// One file in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// Canonical path of the file.
    pub id: String,
    /// Files this file depends on. Direct edges after construction, the
    /// full transitive closure (plus the file itself) after closure.
    pub depends_on: FixedBitSet,
    /// Exact inverse of `depends_on`; empty until closure runs.
    pub depended_on_by: FixedBitSet,
    /// `|depended_on_by|`, set by the visibility pass.
    pub fan_in: usize,
    /// `|depends_on|`, set by the visibility pass.
    pub fan_out: usize,
    /// Content hash of the sorted closed dependency ids.
    pub fingerprint: String,
    /// Position in the rendered layout, assigned during partitioning.
    pub display_index: Option<usize>,
}

impl FileNode {
    /// Create a node with empty sets sized for `capacity` files.
    #[must_use]
    pub fn new(id: impl Into<String>, capacity: usize) -> Self {
        Self {
            id: id.into(),
            depends_on: FixedBitSet::with_capacity(capacity),
            depended_on_by: FixedBitSet::with_capacity(capacity),
            fan_in: 0,
            fan_out: 0,
            fingerprint: String::new(),
            display_index: None,
        }
    }
}

// ---------------------------------------------------------------------------
// FileGraph
// ---------------------------------------------------------------------------

/// The authoritative node arena plus the direct-edge graph.
///
/// Node weights are [`FileNode`]s; edges are the direct references from the
/// input and are never modified after construction. Closure results live in
/// the node sets, not as extra edges.
#[derive(Debug)]
pub struct FileGraph {
    /// Directed graph: edge `B → A` means A depends on B.
    pub graph: DiGraph<FileNode, ()>,
    /// Mapping from file id to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    /// BLAKE3 content hash of the sorted direct edge list.
    pub content_hash: String,
}

impl FileGraph {
    /// Build a [`FileGraph`] from direct edges.
    ///
    /// Every key of `edges` becomes a node; nodes are inserted in
    /// lexicographic order so indices are stable for a given input.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DanglingReference`] if a file references an id
    /// that is not itself a key of `edges`.
    #[instrument(skip(edges), fields(files = edges.len()))]
    pub fn from_edges(edges: &EdgeMap) -> Result<Self, GraphError> {
        let capacity = edges.len();
        let mut graph = DiGraph::<FileNode, ()>::with_capacity(capacity, 0);
        let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(capacity);

        for id in edges.keys() {
            let idx = graph.add_node(FileNode::new(id.clone(), capacity));
            node_map.insert(id.clone(), idx);
        }

        // Validate everything before wiring any edge.
        for (file, targets) in edges {
            if let Some(target) = targets.iter().find(|t| !node_map.contains_key(*t)) {
                return Err(GraphError::DanglingReference {
                    file: file.clone(),
                    target: target.clone(),
                });
            }
        }

        let mut pairs: Vec<(&str, &str)> = Vec::new();
        for (file, targets) in edges {
            let dependent = node_map[file];
            for target in targets {
                let dependency = node_map[target];
                graph[dependent].depends_on.insert(dependency.index());
                graph.add_edge(dependency, dependent, ());
                pairs.push((target.as_str(), file.as_str()));
            }
        }

        pairs.sort_unstable();
        let content_hash = compute_edge_hash(&pairs);

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built file graph"
        );

        Ok(Self {
            graph,
            node_map,
            content_hash,
        })
    }

    /// Return the number of files in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of direct references in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for a file id.
    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Look up a node by file id.
    #[must_use]
    pub fn file(&self, id: &str) -> Option<&FileNode> {
        self.node_index(id).map(|idx| &self.graph[idx])
    }

    /// Iterate over all nodes in index order.
    pub fn files(&self) -> impl Iterator<Item = &FileNode> {
        self.graph.node_weights()
    }

    /// Resolve a bitset of node indices into sorted file ids.
    #[must_use]
    pub fn ids_of(&self, set: &FixedBitSet) -> Vec<&str> {
        let mut ids: Vec<&str> = set
            .ones()
            .map(|bit| self.graph[NodeIndex::new(bit)].id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Sorted ids of the files `id` depends on, or `None` for unknown ids.
    #[must_use]
    pub fn depends_on(&self, id: &str) -> Option<Vec<&str>> {
        self.file(id).map(|node| self.ids_of(&node.depends_on))
    }

    /// Sorted ids of the files that depend on `id`, or `None` for unknown ids.
    #[must_use]
    pub fn depended_on_by(&self, id: &str) -> Option<Vec<&str>> {
        self.file(id).map(|node| self.ids_of(&node.depended_on_by))
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// BLAKE3 hash of the sorted `(dependency, dependent)` edge list.
fn compute_edge_hash(pairs: &[(&str, &str)]) -> String {
    let mut hasher = blake3::Hasher::new();
    for (dependency, dependent) in pairs {
        hasher.update(dependency.as_bytes());
        hasher.update(b"\x00");
        hasher.update(dependent.as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
