//! Visibility metrics for the closed dependency graph.
//!
//! # Statistics Provided
//!
//! - **fan_in** (per file): number of files that can reach it, itself
//!   included (`|depended_on_by|`).
//! - **fan_out** (per file): number of files it can reach, itself included
//!   (`|depends_on|`).
//! - **propagation_cost**: `Σ fan_in / N²`, the fraction of file pairs
//!   joined by a dependency path. With the self-loop convention it lies in
//!   `[1/N, 1]`; an empty graph reports 0.0.
//!
//! The totals of fan-in and fan-out must agree. A mismatch means the
//! inversion was not exact and every downstream number would be wrong, so it
//! is surfaced as [`GraphError::FanImbalance`].

use serde::Serialize;
use tracing::{info, instrument};

use crate::error::GraphError;
use crate::graph::build::FileGraph;

/// Graph-wide visibility summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibilityStats {
    pub file_count: usize,
    pub total_fan_in: usize,
    pub total_fan_out: usize,
    pub max_fan_in: usize,
    pub max_fan_out: usize,
    pub propagation_cost: f64,
}

/// Set `fan_in`/`fan_out` on every node and compute the propagation cost.
///
/// Call after [`crate::graph::closure::close`].
///
/// # Errors
///
/// Returns [`GraphError::FanImbalance`] if total fan-in and fan-out differ.
#[instrument(skip(graph), fields(files = graph.node_count()))]
pub fn compute_visibility(graph: &mut FileGraph) -> Result<VisibilityStats, GraphError> {
    for file in graph.graph.node_weights_mut() {
        file.fan_in = file.depended_on_by.count_ones(..);
        file.fan_out = file.depends_on.count_ones(..);
    }

    let total_fan_in: usize = graph.files().map(|f| f.fan_in).sum();
    let total_fan_out: usize = graph.files().map(|f| f.fan_out).sum();
    if total_fan_in != total_fan_out {
        return Err(GraphError::FanImbalance {
            stage: "visibility",
            fan_in: total_fan_in,
            fan_out: total_fan_out,
        });
    }

    let file_count = graph.node_count();
    let propagation_cost = compute_propagation_cost(total_fan_in, file_count);
    info!(
        files = file_count,
        propagation_cost, "computed visibility metrics"
    );

    Ok(VisibilityStats {
        file_count,
        total_fan_in,
        total_fan_out,
        max_fan_in: graph.files().map(|f| f.fan_in).max().unwrap_or(0),
        max_fan_out: graph.files().map(|f| f.fan_out).max().unwrap_or(0),
        propagation_cost,
    })
}

/// Verify that the summed set sizes of `depended_on_by` and `depends_on`
/// agree. Returns the shared total.
///
/// # Errors
///
/// Returns [`GraphError::FanImbalance`] tagged with `stage` on mismatch.
pub fn check_balance(graph: &FileGraph, stage: &'static str) -> Result<usize, GraphError> {
    let fan_in: usize = graph
        .files()
        .map(|f| f.depended_on_by.count_ones(..))
        .sum();
    let fan_out: usize = graph.files().map(|f| f.depends_on.count_ones(..)).sum();

    if fan_in == fan_out {
        Ok(fan_in)
    } else {
        Err(GraphError::FanImbalance {
            stage,
            fan_in,
            fan_out,
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn compute_propagation_cost(total_fan_in: usize, file_count: usize) -> f64 {
    if file_count == 0 {
        return 0.0_f64;
    }
    let pairs = (file_count * file_count) as f64;
    total_fan_in as f64 / pairs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
