//! `tangle partitions`: the four-quadrant layout handed to a renderer.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use tangle_core::Report;

use super::{RunContext, analyze_source};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `tangle partitions`.
#[derive(Args, Debug)]
pub struct PartitionsArgs {
    /// Edge input file (JSON), or `-` for stdin.
    #[arg(value_name = "EDGES")]
    pub input: PathBuf,
}

fn join_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// One row per file in display order.
fn write_text(report: &Report, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "index\tquadrant\tfan_in\tfan_out\tfile\tdepends_on")?;
    for partition in &report.partitions {
        for file in partition.groups.iter().flat_map(|g| g.files.iter()) {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}",
                file.display_index,
                partition.kind,
                file.fan_in,
                file.fan_out,
                file.display_id,
                join_indices(&file.depends_on)
            )?;
        }
    }
    Ok(())
}

fn write_pretty(report: &Report, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Layout")?;
    pretty_kv(w, "files", report.file_count.to_string())?;
    pretty_kv(w, "propagation", format!("{:.4}", report.propagation_cost))?;
    pretty_kv(
        w,
        "threshold",
        format!(
            "fan-in >= {}, fan-out >= {} ({})",
            report.threshold.fan_in, report.threshold.fan_out, report.view
        ),
    )?;
    if !report.common_prefix.is_empty() {
        pretty_kv(w, "prefix", &report.common_prefix)?;
    }

    for partition in &report.partitions {
        writeln!(w)?;
        let heading = if partition.file_count == 0 {
            format!("{} (empty)", partition.kind)
        } else {
            format!(
                "{} ({} files, [{}..{}])",
                partition.kind,
                partition.file_count,
                partition.lowest_index,
                partition.highest_index
            )
        };
        pretty_section(w, &heading)?;
        for group in &partition.groups {
            if group.file_count > 1 {
                writeln!(
                    w,
                    "  cycle of {} (fan-in {}, fan-out {})",
                    group.file_count, group.fan_in, group.fan_out
                )?;
            }
            for file in &group.files {
                writeln!(
                    w,
                    "  {:>5}  {:<40} in {:>4}  out {:>4}",
                    file.display_index, file.display_id, file.fan_in, file.fan_out
                )?;
            }
        }
    }
    Ok(())
}

/// Execute `tangle partitions`.
pub fn run_partitions(args: &PartitionsArgs, ctx: &RunContext) -> anyhow::Result<()> {
    let analysis = analyze_source(&args.input, ctx)?;
    let report = analysis.report(ctx.trim_prefix);
    render_mode(ctx.output, &report, write_text, write_pretty)
}
