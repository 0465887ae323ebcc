//! Dependency graph module: construction, closure, and visibility metrics.
//!
//! # Overview
//!
//! This module turns raw per-file references into a closed dependency graph
//! whose nodes carry visibility fan-in/fan-out. Everything downstream (cyclic
//! grouping, partitioning, the report) reads from the [`FileGraph`] arena
//! built here.
//!
//! ## Pipeline
//!
//! ```text
//! EdgeMap { file → direct refs }
//!        ↓  build::FileGraph::from_edges()
//! FileGraph (direct edges, may contain cycles)
//!        ↓  closure::close()
//! FileGraph (transitive depends_on, exact depended_on_by, self-loops)
//!        ↓  stats::compute_visibility()
//! FileGraph (fan_in / fan_out) + VisibilityStats (propagation cost)
//! ```
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use tangle_core::graph::{FileGraph, close, compute_visibility};
//!
//! let mut graph = FileGraph::from_edges(&edges)?;
//! let closure = close(&mut graph)?;
//! let stats = compute_visibility(&mut graph)?;
//!
//! println!("files={} residue={} cost={:.3}",
//!     stats.file_count, closure.residue_count, stats.propagation_cost);
//! ```

pub mod build;
pub mod closure;
pub mod stats;

// Re-export primary types at module level for convenience.
pub use build::{EdgeMap, FileGraph, FileNode};
pub use closure::{ClosureStats, close};
pub use stats::{VisibilityStats, check_balance, compute_visibility};
