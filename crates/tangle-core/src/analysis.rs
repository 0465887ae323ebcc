//! End-to-end analysis pipeline and its serializable report.
//!
//! ```text
//! EdgeMap
//!   → FileGraph::from_edges   (validate, arena)
//!   → close                   (transitive closure, inverse, self-loops)
//!   → compute_visibility      (fan-in/out, propagation cost)
//!   → assign_fingerprints     (BLAKE3 of closed sets)
//!   → group_files             (cyclic groups, core count)
//!   → select_threshold        (core-periphery | median)
//!   → build_partitions        (quadrants, display indices)
//! ```

use serde::Serialize;
use tracing::{info, instrument};

use crate::config::ViewMode;
use crate::error::GraphError;
use crate::graph::{ClosureStats, EdgeMap, FileGraph, VisibilityStats, close, compute_visibility};
use crate::partition::{
    CyclicalGroup, Partition, Quadrant, Threshold, assign_fingerprints, build_partitions,
    group_files, select_threshold,
};
use crate::prefix::{longest_filename_prefix, trim_prefix};

/// A completed analysis run.
#[derive(Debug)]
pub struct Analysis {
    pub graph: FileGraph,
    pub view: ViewMode,
    pub closure: ClosureStats,
    pub visibility: VisibilityStats,
    /// Cyclic groups in group order.
    pub groups: Vec<CyclicalGroup>,
    /// File count of the largest cyclic group.
    pub core_count: usize,
    pub threshold: Threshold,
    /// Partitions in display order: shared, core, periphery, control.
    pub partitions: [Partition; 4],
}

impl Analysis {
    /// Run the whole pipeline over `edges`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DanglingReference`] for invalid input, and the
    /// internal-consistency variants if a closure invariant breaks.
    #[instrument(skip(edges, view), fields(files = edges.len(), view = %view))]
    pub fn run(edges: &EdgeMap, view: ViewMode) -> Result<Self, GraphError> {
        let mut graph = FileGraph::from_edges(edges)?;
        let closure = close(&mut graph)?;
        let visibility = compute_visibility(&mut graph)?;

        assign_fingerprints(&mut graph);
        let grouping = group_files(&graph);
        let threshold = select_threshold(view, &graph, &grouping);
        let core_count = grouping.core_count;
        let partitions = build_partitions(grouping.groups.clone(), threshold, &mut graph);

        info!(
            files = graph.node_count(),
            core_count,
            propagation_cost = visibility.propagation_cost,
            threshold_fan_in = threshold.fan_in,
            threshold_fan_out = threshold.fan_out,
            "analysis complete"
        );

        Ok(Self {
            graph,
            view,
            closure,
            visibility,
            groups: grouping.groups,
            core_count,
            threshold,
            partitions,
        })
    }

    #[must_use]
    pub fn file_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn propagation_cost(&self) -> f64 {
        self.visibility.propagation_cost
    }

    /// `core_count / file_count`, or 0.0 for an empty graph.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn core_ratio(&self) -> f64 {
        let files = self.file_count();
        if files == 0 {
            0.0
        } else {
            self.core_count as f64 / files as f64
        }
    }

    /// The partition for `quadrant`.
    #[must_use]
    pub fn partition(&self, quadrant: Quadrant) -> &Partition {
        let pos = Quadrant::ORDER
            .iter()
            .position(|q| *q == quadrant)
            .unwrap_or_default();
        &self.partitions[pos]
    }

    /// Package the run for output. With `trim_common_prefix`, display ids
    /// drop the directory prefix shared by every file.
    #[must_use]
    pub fn report(&self, trim_common_prefix: bool) -> Report {
        let common_prefix = self.common_prefix(trim_common_prefix);

        let partitions = self
            .partitions
            .iter()
            .map(|p| self.partition_report(p, &common_prefix))
            .collect();

        Report {
            propagation_cost: self.propagation_cost(),
            core_count: self.core_count,
            file_count: self.file_count(),
            core_ratio: self.core_ratio(),
            view: self.view,
            threshold: self.threshold,
            common_prefix,
            content_hash: self.graph.content_hash.clone(),
            relaxation_passes: self.closure.relaxation_passes,
            cyclic_residue: self.closure.residue_count,
            partitions,
        }
    }

    /// Directory prefix shared by every file id, or `""` when not trimming.
    #[must_use]
    pub fn common_prefix(&self, trim: bool) -> String {
        if trim {
            longest_filename_prefix(&self.graph)
        } else {
            String::new()
        }
    }

    fn partition_report(&self, partition: &Partition, prefix: &str) -> PartitionReport {
        PartitionReport {
            kind: partition.quadrant,
            file_count: partition.file_count,
            lowest_index: partition.lowest_index,
            highest_index: partition.highest_index,
            groups: partition
                .groups
                .iter()
                .map(|g| self.group_report(g, prefix))
                .collect(),
        }
    }

    /// Report one group with display ids relative to `prefix`.
    #[must_use]
    pub fn group_report(&self, group: &CyclicalGroup, prefix: &str) -> GroupReport {
        let files = group
            .files
            .iter()
            .map(|idx| {
                let node = &self.graph.graph[*idx];
                let mut depends_on: Vec<usize> = node
                    .depends_on
                    .ones()
                    .filter_map(|bit| {
                        self.graph.graph[petgraph::graph::NodeIndex::new(bit)].display_index
                    })
                    .collect();
                depends_on.sort_unstable();

                FileReport {
                    id: node.id.clone(),
                    display_id: trim_prefix(&node.id, prefix).to_string(),
                    display_index: node.display_index.unwrap_or_default(),
                    fan_in: node.fan_in,
                    fan_out: node.fan_out,
                    fingerprint: node.fingerprint.clone(),
                    depends_on,
                }
            })
            .collect();

        GroupReport {
            fan_in: group.fan_in,
            fan_out: group.fan_out,
            fingerprint: group.fingerprint.clone(),
            file_count: group.file_count,
            files,
        }
    }
}

/// Serializable result of an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub propagation_cost: f64,
    pub core_count: usize,
    pub file_count: usize,
    pub core_ratio: f64,
    pub view: ViewMode,
    pub threshold: Threshold,
    pub common_prefix: String,
    pub content_hash: String,
    pub relaxation_passes: usize,
    pub cyclic_residue: usize,
    pub partitions: Vec<PartitionReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionReport {
    pub kind: Quadrant,
    pub file_count: usize,
    pub lowest_index: usize,
    pub highest_index: usize,
    pub groups: Vec<GroupReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReport {
    pub fan_in: usize,
    pub fan_out: usize,
    pub fingerprint: String,
    pub file_count: usize,
    pub files: Vec<FileReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub id: String,
    pub display_id: String,
    pub display_index: usize,
    pub fan_in: usize,
    pub fan_out: usize,
    pub fingerprint: String,
    /// Display indices of the files this one depends on, itself included.
    pub depends_on: Vec<usize>,
}
