//! Cyclic grouping and the four-quadrant display partition.
//!
//! # Overview
//!
//! Groups are classified against a visibility [`Threshold`]:
//!
//! | fan-in vs `fan_in*` | fan-out vs `fan_out*` | quadrant  |
//! |---------------------|-----------------------|-----------|
//! | `≥`                 | `<`                   | shared    |
//! | `<`                 | `<`                   | periphery |
//! | `<`                 | `≥`                   | control   |
//! | `≥`                 | `≥`                   | core      |
//!
//! Partitions are laid out in the fixed order shared, core, periphery,
//! control, and every file gets a global display index in that walk.

pub mod group;
pub mod threshold;

use petgraph::graph::NodeIndex;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::graph::build::FileGraph;

pub use group::{CyclicalGroup, Grouping, assign_fingerprints, group_files};
pub use threshold::{Threshold, select_threshold};

/// Architectural role of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quadrant {
    Shared,
    Core,
    Periphery,
    Control,
}

impl Quadrant {
    /// Display order of the partitions.
    pub const ORDER: [Self; 4] = [Self::Shared, Self::Core, Self::Periphery, Self::Control];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::Core => "core",
            Self::Periphery => "periphery",
            Self::Control => "control",
        }
    }

    const fn position(self) -> usize {
        match self {
            Self::Shared => 0,
            Self::Core => 1,
            Self::Periphery => 2,
            Self::Control => 3,
        }
    }
}

impl std::fmt::Display for Quadrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a fan-in/fan-out pair against `threshold`.
#[must_use]
pub const fn classify(fan_in: usize, fan_out: usize, threshold: Threshold) -> Quadrant {
    let high_in = fan_in >= threshold.fan_in;
    let high_out = fan_out >= threshold.fan_out;
    match (high_in, high_out) {
        (true, false) => Quadrant::Shared,
        (false, false) => Quadrant::Periphery,
        (false, true) => Quadrant::Control,
        (true, true) => Quadrant::Core,
    }
}

/// One quadrant of the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub quadrant: Quadrant,
    pub groups: Vec<CyclicalGroup>,
    pub file_count: usize,
    pub lowest_index: usize,
    pub highest_index: usize,
}

impl Partition {
    const fn empty(quadrant: Quadrant) -> Self {
        Self {
            quadrant,
            groups: Vec::new(),
            file_count: 0,
            lowest_index: 0,
            highest_index: 0,
        }
    }

    /// Iterate over member files in display order.
    pub fn files(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.groups.iter().flat_map(|g| g.files.iter().copied())
    }
}

/// Classify `groups`, lay them out, and write display indices onto the
/// graph's nodes.
///
/// Groups keep their incoming order inside each partition. The lowest index
/// of the first partition is never written and stays 0. For the others it is
/// overwritten while it still reads 0 or a lower index turns up, so a later
/// partition that starts at global index 0 with two or more files reports 1.
/// Empty partitions report 0/0.
#[instrument(skip(groups, graph), fields(groups = groups.len()))]
pub fn build_partitions(
    groups: Vec<CyclicalGroup>,
    threshold: Threshold,
    graph: &mut FileGraph,
) -> [Partition; 4] {
    let mut partitions = Quadrant::ORDER.map(Partition::empty);
    for group in groups {
        let quadrant = classify(group.fan_in, group.fan_out, threshold);
        partitions[quadrant.position()].groups.push(group);
    }

    let mut index = 0;
    for (position, partition) in partitions.iter_mut().enumerate() {
        for file in partition.groups.iter().flat_map(|g| g.files.iter()) {
            graph.graph[*file].display_index = Some(index);
            if position > 0 && (partition.lowest_index == 0 || index < partition.lowest_index) {
                partition.lowest_index = index;
            }
            partition.file_count += 1;
            if index > partition.highest_index {
                partition.highest_index = index;
            }
            index += 1;
        }
        debug!(
            quadrant = %partition.quadrant,
            files = partition.file_count,
            groups = partition.groups.len(),
            "assembled partition"
        );
    }

    partitions
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
