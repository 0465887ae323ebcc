//! `tangle analyze`: headline dependency-structure metrics.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tangle_core::partition::{Quadrant, Threshold};
use tangle_core::{Analysis, ViewMode};

use super::{RunContext, analyze_source};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `tangle analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Edge input file (JSON), or `-` for stdin.
    #[arg(value_name = "EDGES")]
    pub input: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct PartitionSize {
    pub kind: Quadrant,
    pub file_count: usize,
    pub group_count: usize,
    pub lowest_index: usize,
    pub highest_index: usize,
}

/// Report payload for `tangle analyze`.
#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    pub file_count: usize,
    pub propagation_cost: f64,
    pub core_count: usize,
    pub core_ratio: f64,
    pub view: ViewMode,
    pub threshold: Threshold,
    pub group_count: usize,
    pub cyclic_group_count: usize,
    pub cyclic_residue: usize,
    pub relaxation_passes: usize,
    pub common_prefix: String,
    pub content_hash: String,
    pub partitions: Vec<PartitionSize>,
}

/// Condense an analysis into its headline numbers.
pub fn summarize(analysis: &Analysis, trim_prefix: bool) -> AnalysisSummary {
    AnalysisSummary {
        file_count: analysis.file_count(),
        propagation_cost: analysis.propagation_cost(),
        core_count: analysis.core_count,
        core_ratio: analysis.core_ratio(),
        view: analysis.view,
        threshold: analysis.threshold,
        group_count: analysis.groups.len(),
        cyclic_group_count: analysis.groups.iter().filter(|g| g.is_cycle()).count(),
        cyclic_residue: analysis.closure.residue_count,
        relaxation_passes: analysis.closure.relaxation_passes,
        common_prefix: analysis.common_prefix(trim_prefix),
        content_hash: analysis.graph.content_hash.clone(),
        partitions: analysis
            .partitions
            .iter()
            .map(|p| PartitionSize {
                kind: p.quadrant,
                file_count: p.file_count,
                group_count: p.groups.len(),
                lowest_index: p.lowest_index,
                highest_index: p.highest_index,
            })
            .collect(),
    }
}

fn write_text(summary: &AnalysisSummary, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "files\t{}", summary.file_count)?;
    writeln!(w, "propagation_cost\t{:.4}", summary.propagation_cost)?;
    writeln!(w, "core\t{}\t{}", summary.core_count, summary.file_count)?;
    writeln!(w, "view\t{}", summary.view)?;
    writeln!(
        w,
        "threshold\t{}\t{}",
        summary.threshold.fan_in, summary.threshold.fan_out
    )?;
    writeln!(w, "cyclic_residue\t{}", summary.cyclic_residue)?;
    for p in &summary.partitions {
        writeln!(w, "{}\t{}", p.kind, p.file_count)?;
    }
    Ok(())
}

fn write_pretty(summary: &AnalysisSummary, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Dependency structure")?;
    pretty_kv(w, "files", summary.file_count.to_string())?;
    pretty_kv(w, "propagation", format!("{:.4}", summary.propagation_cost))?;
    pretty_kv(
        w,
        "core size",
        format!(
            "{} / {} == {:.2}",
            summary.core_count, summary.file_count, summary.core_ratio
        ),
    )?;
    pretty_kv(w, "view", summary.view.as_str())?;
    pretty_kv(
        w,
        "threshold",
        format!(
            "fan-in >= {}, fan-out >= {}",
            summary.threshold.fan_in, summary.threshold.fan_out
        ),
    )?;
    pretty_kv(
        w,
        "groups",
        format!(
            "{} ({} cyclic)",
            summary.group_count, summary.cyclic_group_count
        ),
    )?;
    pretty_kv(
        w,
        "residue",
        format!(
            "{} files, {} passes",
            summary.cyclic_residue, summary.relaxation_passes
        ),
    )?;
    if !summary.common_prefix.is_empty() {
        pretty_kv(w, "prefix", &summary.common_prefix)?;
    }

    writeln!(w)?;
    pretty_section(w, "Partitions")?;
    for p in &summary.partitions {
        if p.file_count == 0 {
            writeln!(w, "{:<10} {:>5} files", p.kind.as_str(), 0)?;
        } else {
            writeln!(
                w,
                "{:<10} {:>5} files  {:>4} groups  [{}..{}]",
                p.kind.as_str(),
                p.file_count,
                p.group_count,
                p.lowest_index,
                p.highest_index
            )?;
        }
    }
    Ok(())
}

/// Execute `tangle analyze`.
pub fn run_analyze(args: &AnalyzeArgs, ctx: &RunContext) -> anyhow::Result<()> {
    let analysis = analyze_source(&args.input, ctx)?;
    let summary = summarize(&analysis, ctx.trim_prefix);
    render_mode(ctx.output, &summary, write_text, write_pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tangle_core::EdgeMap;

    fn sample() -> Analysis {
        let edges: EdgeMap = serde_json::from_str(
            r#"{
                "src/a.go": ["src/b.go"],
                "src/b.go": ["src/a.go", "src/c.go"],
                "src/c.go": []
            }"#,
        )
        .expect("edges");
        Analysis::run(&edges, ViewMode::CorePeriphery).expect("analysis")
    }

    #[test]
    fn summary_counts() {
        let summary = summarize(&sample(), true);
        assert_eq!(summary.file_count, 3);
        assert_eq!(summary.core_count, 2);
        assert_eq!(summary.group_count, 2);
        assert_eq!(summary.cyclic_group_count, 1);
        assert_eq!(summary.common_prefix, "src");
        assert_eq!(summary.partitions.len(), 4);
        assert_eq!(
            summary.partitions.iter().map(|p| p.file_count).sum::<usize>(),
            3
        );
    }

    #[test]
    fn text_output_is_tab_separated() {
        let summary = summarize(&sample(), true);
        let mut buf = Vec::new();
        write_text(&summary, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("files\t3\n"));
        assert!(text.contains("core\t2\t3\n"));
        assert!(text.contains("view\tcore-periphery\n"));
    }

    #[test]
    fn pretty_output_has_sections() {
        let summary = summarize(&sample(), false);
        let mut buf = Vec::new();
        write_pretty(&summary, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("Dependency structure"));
        assert!(text.contains("Partitions"));
        assert!(text.contains("core size:"));
        assert!(!text.contains("prefix:"));
    }
}
