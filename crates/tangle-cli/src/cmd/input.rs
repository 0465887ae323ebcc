//! Edge input: a JSON object mapping each file id to the ids it references.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use tangle_core::{EdgeMap, ErrorCode};
use tracing::warn;

use crate::output::{CliError, OutputMode, render_error};

/// Path argument meaning "read standard input".
pub const STDIN_MARKER: &str = "-";

/// Parse edge JSON.
pub fn parse_edges(raw: &str) -> Result<EdgeMap, serde_json::Error> {
    serde_json::from_str(raw)
}

fn read_source(source: &Path) -> anyhow::Result<String> {
    if source == Path::new(STDIN_MARKER) {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read edges from stdin")?;
        Ok(raw)
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read {}", source.display()))
    }
}

/// Read and parse edges from a file, or stdin for `-`.
pub fn load_edges(source: &Path, output: OutputMode) -> anyhow::Result<EdgeMap> {
    let raw = match read_source(source) {
        Ok(raw) => raw,
        Err(err) => {
            render_error(output, &CliError::new(format!("{err:#}")))?;
            return Err(err);
        }
    };

    match parse_edges(&raw) {
        Ok(edges) => {
            if edges.is_empty() {
                warn!(source = %source.display(), "edge input contains no files");
            }
            Ok(edges)
        }
        Err(err) => {
            render_error(
                output,
                &CliError::with_code(
                    format!("invalid edge input in {}: {err}", source.display()),
                    ErrorCode::InputParseError,
                ),
            )?;
            Err(anyhow::Error::new(err).context(format!("parsing {}", source.display())))
        }
    }
}
