#![forbid(unsafe_code)]
//! tangle-core library.
//!
//! Dependency-structure analysis over a file-level "depends on" graph:
//! cycle-tolerant transitive closure, visibility fan-in/fan-out, propagation
//! cost, cyclic-equivalence groups, and the four-way core-periphery
//! partition handed to a renderer.
//!
//! # Conventions
//!
//! - **Errors**: graph faults are [`error::GraphError`]; application-level
//!   code (config loading) uses `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).
//!
//! # Typical Usage
//!
//! ```rust,ignore
//! use tangle_core::{Analysis, EdgeMap, ViewMode};
//!
//! let edges: EdgeMap = serde_json::from_str(input)?;
//! let analysis = Analysis::run(&edges, ViewMode::CorePeriphery)?;
//! let report = analysis.report(true);
//!
//! println!("propagation cost: {:.4}", report.propagation_cost);
//! println!("core size: {} / {}", report.core_count, report.file_count);
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod graph;
pub mod partition;
pub mod prefix;

pub use analysis::{Analysis, Report};
pub use config::{ProjectConfig, ViewMode};
pub use error::{ErrorCode, GraphError};
pub use graph::EdgeMap;
