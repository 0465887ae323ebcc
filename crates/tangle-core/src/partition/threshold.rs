//! Visibility threshold selection.
//!
//! The threshold pair `(fan_in*, fan_out*)` splits groups into quadrants.
//! Two policies are available, selected by [`ViewMode`]:
//!
//! - **core-periphery**: the fan counts of the largest cyclic group (the
//!   first group in group order whose size equals `core_count`).
//! - **median**: the fan counts of the median file under the canonical file
//!   order. For an even count the two middle files are averaged with integer
//!   truncation.

use serde::Serialize;

use crate::config::ViewMode;
use crate::graph::build::FileGraph;
use crate::partition::group::{CyclicalGroup, Grouping, sorted_files};

/// Fan-in/fan-out pair used to classify groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Threshold {
    pub fan_in: usize,
    pub fan_out: usize,
}

impl Threshold {
    #[must_use]
    pub const fn new(fan_in: usize, fan_out: usize) -> Self {
        Self { fan_in, fan_out }
    }
}

/// Pick the threshold for `view`.
#[must_use]
pub fn select_threshold(view: ViewMode, graph: &FileGraph, grouping: &Grouping) -> Threshold {
    match view {
        ViewMode::CorePeriphery => core_periphery_threshold(&grouping.groups, grouping.core_count),
        ViewMode::Median => median_threshold(graph),
    }
}

/// Fan counts of the first group holding `core_count` files, or `(0, 0)`
/// when there is none.
#[must_use]
pub fn core_periphery_threshold(groups: &[CyclicalGroup], core_count: usize) -> Threshold {
    groups
        .iter()
        .find(|group| group.file_count == core_count)
        .map(|group| Threshold::new(group.fan_in, group.fan_out))
        .unwrap_or_default()
}

/// Fan counts of the median file in canonical file order.
///
/// ```text
/// odd:  1 file → 0;  3 → 1;  5 → 2        index (n - 1) / 2
/// even: 2 files → 0,1;  4 → 1,2;  6 → 2,3  indices n/2 - 1 and n/2
/// ```
///
/// An empty graph yields `(0, 0)`.
#[must_use]
pub fn median_threshold(graph: &FileGraph) -> Threshold {
    let order = sorted_files(graph);
    let n = order.len();
    if n == 0 {
        return Threshold::default();
    }

    if n % 2 == 0 {
        let lower = &graph.graph[order[n / 2 - 1]];
        let upper = &graph.graph[order[n / 2]];
        Threshold::new(
            (lower.fan_in + upper.fan_in) / 2,
            (lower.fan_out + upper.fan_out) / 2,
        )
    } else {
        let middle = &graph.graph[order[(n - 1) / 2]];
        Threshold::new(middle.fan_in, middle.fan_out)
    }
}
