pub mod analyze;
pub mod completions;
pub mod groups;
pub mod input;
pub mod partitions;

use std::path::Path;

use tangle_core::{Analysis, ViewMode};
use tracing::{debug, info};

use crate::output::{CliError, OutputMode, render_error};

/// Settings resolved from flags, environment, and config before a command runs.
#[derive(Debug, Clone, Copy)]
pub struct RunContext {
    pub output: OutputMode,
    pub view: ViewMode,
    pub trim_prefix: bool,
}

/// Load edges from `source` and run the analysis pipeline.
///
/// Failures are rendered as structured errors before being returned.
pub fn analyze_source(source: &Path, ctx: &RunContext) -> anyhow::Result<Analysis> {
    let edges = input::load_edges(source, ctx.output)?;
    info!(files = edges.len(), view = %ctx.view, "loaded edge input");

    match Analysis::run(&edges, ctx.view) {
        Ok(analysis) => Ok(analysis),
        Err(err) => {
            let code = err.code();
            debug!(code = %code, kind = code.message(), "analysis failed");
            render_error(ctx.output, &CliError::from(&err))?;
            Err(err.into())
        }
    }
}
