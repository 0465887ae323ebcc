#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use cmd::RunContext;
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::PathBuf;
use tangle_core::config::{self, ProjectConfig};
use tangle_core::{ErrorCode, ViewMode};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tangle: file-level dependency structure analysis",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Threshold policy: core-periphery or median.
    #[arg(long, global = true, value_name = "VIEW")]
    view: Option<ViewMode>,

    /// Config file to use instead of .tangle/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for --format json.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Show full file ids instead of trimming the shared directory prefix.
    #[arg(long, global = true)]
    full_paths: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Analysis",
        about = "Summarize dependency structure",
        long_about = "Report file count, propagation cost, core size, threshold, and partition sizes.",
        after_help = "EXAMPLES:\n    # Analyze an edge file\n    tangle analyze edges.json\n\n    # Read edges from stdin\n    extract-refs | tangle analyze -\n\n    # Use the median threshold\n    tangle analyze edges.json --view median"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "List cyclic-equivalence groups",
        long_about = "List groups of files sharing one closed dependency set, in group order.",
        after_help = "EXAMPLES:\n    # All groups\n    tangle groups edges.json\n\n    # Only groups that form a cycle\n    tangle groups edges.json --cycles-only --json"
    )]
    Groups(cmd::groups::GroupsArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Show the four-quadrant layout",
        long_about = "Show shared, core, periphery, and control partitions with display indices and dependency cells.",
        after_help = "EXAMPLES:\n    # Human layout\n    tangle partitions edges.json\n\n    # Full render hand-off as JSON\n    tangle partitions edges.json --json"
    )]
    Partitions(cmd::partitions::PartitionsArgs),

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    tangle completions bash\n\n    # Generate zsh completions\n    tangle completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("TANGLE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if quiet {
            "error"
        } else if verbose || env::var("DEBUG").is_ok() {
            "tangle=debug,info"
        } else {
            "tangle=info,warn"
        })
    });

    let format = env::var("TANGLE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Load the project config, honoring `--config` when given.
fn load_config(cli: &Cli, output: OutputMode) -> anyhow::Result<ProjectConfig> {
    let loaded = match cli.config {
        Some(ref path) => config::load_config_file(path, true),
        None => config::load_project_config(&env::current_dir()?),
    };

    match loaded {
        Ok(config) => Ok(config),
        Err(err) => {
            render_error(
                output,
                &CliError::with_code(format!("{err:#}"), ErrorCode::ConfigParseError),
            )?;
            Err(err)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let output = cli.output_mode();

    if let Commands::Completions(ref args) = cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let project_config = load_config(&cli, output)?;
    let view = match config::resolve_view(cli.view, &project_config) {
        Ok(view) => view,
        Err(err) => {
            render_error(
                output,
                &CliError::with_code(format!("{err:#}"), ErrorCode::ConfigParseError),
            )?;
            return Err(err);
        }
    };

    let ctx = RunContext {
        output,
        view,
        trim_prefix: project_config.output.trim_common_prefix && !cli.full_paths,
    };
    debug!(?ctx, "resolved run context");

    match cli.command {
        Commands::Analyze(ref args) => cmd::analyze::run_analyze(args, &ctx),
        Commands::Groups(ref args) => cmd::groups::run_groups(args, &ctx),
        Commands::Partitions(ref args) => cmd::partitions::run_partitions(args, &ctx),
        Commands::Completions(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_subcommand_parses() {
        let cli = Cli::parse_from(["tangle", "analyze", "edges.json"]);
        assert!(matches!(cli.command, Commands::Analyze(_)));
    }

    #[test]
    fn stdin_marker_is_accepted() {
        let cli = Cli::parse_from(["tangle", "partitions", "-"]);
        match cli.command {
            Commands::Partitions(args) => assert_eq!(args.input, PathBuf::from("-")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn view_flag_parses_before_and_after_subcommand() {
        let cli = Cli::parse_from(["tangle", "--view", "median", "analyze", "e.json"]);
        assert_eq!(cli.view, Some(ViewMode::Median));

        let cli = Cli::parse_from(["tangle", "analyze", "e.json", "--view", "core-periphery"]);
        assert_eq!(cli.view, Some(ViewMode::CorePeriphery));
    }

    #[test]
    fn unknown_view_is_rejected() {
        let result = Cli::try_parse_from(["tangle", "--view", "sideways", "analyze", "e.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn json_flag_sets_output_mode() {
        let cli = Cli::parse_from(["tangle", "groups", "e.json", "--json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn format_flag_parses() {
        let cli = Cli::parse_from(["tangle", "--format", "text", "analyze", "e.json"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["tangle", "-q", "-v", "analyze", "e.json"]).is_err());
        assert!(Cli::parse_from(["tangle", "-q", "analyze", "e.json"]).quiet);
    }

    #[test]
    fn groups_flags_parse() {
        let cli = Cli::parse_from(["tangle", "groups", "e.json", "--cycles-only", "--limit", "5"]);
        match cli.command {
            Commands::Groups(args) => {
                assert!(args.cycles_only);
                assert_eq!(args.limit, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["tangle", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["tangle", "analyze", "x.json"],
            vec!["tangle", "groups", "x.json"],
            vec!["tangle", "partitions", "x.json"],
            vec!["tangle", "completions", "zsh"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "Failed to parse: {args:?}: {:?}", result.err());
        }
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
