//! `tangle groups`: cyclic-equivalence groups in group order.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tangle_core::Analysis;
use tangle_core::partition::{Quadrant, classify};

use super::{RunContext, analyze_source};
use crate::output::{pretty_rule, pretty_section, render_mode};

/// Fingerprint characters shown in human output.
const SHORT_FINGERPRINT: usize = 12;

/// Arguments for `tangle groups`.
#[derive(Args, Debug)]
pub struct GroupsArgs {
    /// Edge input file (JSON), or `-` for stdin.
    #[arg(value_name = "EDGES")]
    pub input: PathBuf,

    /// Only list groups with more than one file.
    #[arg(long)]
    pub cycles_only: bool,

    /// Show at most this many groups.
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GroupRow {
    /// Position in group order, starting at 1.
    pub rank: usize,
    pub quadrant: Quadrant,
    pub fan_in: usize,
    pub fan_out: usize,
    pub file_count: usize,
    pub fingerprint: String,
    pub files: Vec<String>,
}

/// Build group rows, filtered and limited per `args`.
pub fn group_rows(analysis: &Analysis, args: &GroupsArgs, trim_prefix: bool) -> Vec<GroupRow> {
    let prefix = analysis.common_prefix(trim_prefix);
    analysis
        .groups
        .iter()
        .enumerate()
        .filter(|(_, group)| !args.cycles_only || group.is_cycle())
        .take(args.limit.unwrap_or(usize::MAX))
        .map(|(pos, group)| {
            let report = analysis.group_report(group, &prefix);
            GroupRow {
                rank: pos + 1,
                quadrant: classify(group.fan_in, group.fan_out, analysis.threshold),
                fan_in: group.fan_in,
                fan_out: group.fan_out,
                file_count: group.file_count,
                fingerprint: group.fingerprint.clone(),
                files: report.files.into_iter().map(|f| f.display_id).collect(),
            }
        })
        .collect()
}

#[allow(clippy::ptr_arg)]
fn write_text(rows: &Vec<GroupRow>, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "rank\tquadrant\tfan_in\tfan_out\tfiles\tmembers")?;
    for row in rows {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            row.rank,
            row.quadrant,
            row.fan_in,
            row.fan_out,
            row.file_count,
            row.files.join(",")
        )?;
    }
    Ok(())
}

#[allow(clippy::ptr_arg)]
fn write_pretty(rows: &Vec<GroupRow>, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Cyclic groups")?;
    if rows.is_empty() {
        writeln!(w, "no groups")?;
        return Ok(());
    }
    writeln!(
        w,
        "{:>4}  {:<10} {:>6} {:>7} {:>5}  fingerprint",
        "#", "quadrant", "fan-in", "fan-out", "files"
    )?;
    pretty_rule(w)?;
    for row in rows {
        let short = row
            .fingerprint
            .get(..SHORT_FINGERPRINT)
            .unwrap_or(row.fingerprint.as_str());
        writeln!(
            w,
            "{:>4}  {:<10} {:>6} {:>7} {:>5}  {short}",
            row.rank,
            row.quadrant.as_str(),
            row.fan_in,
            row.fan_out,
            row.file_count
        )?;
        for file in &row.files {
            writeln!(w, "        {file}")?;
        }
    }
    Ok(())
}

/// Execute `tangle groups`.
pub fn run_groups(args: &GroupsArgs, ctx: &RunContext) -> anyhow::Result<()> {
    let analysis = analyze_source(&args.input, ctx)?;
    let rows = group_rows(&analysis, args, ctx.trim_prefix);
    render_mode(ctx.output, &rows, write_text, write_pretty)
}
