//! CLI command definitions and handlers

mod avg;
mod details;
mod doctor;
mod init;
mod watch;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cyclolens::analyzer::ProcessInvoker;
use cyclolens::config::{load_project_config, ProjectConfig};
use cyclolens::controller::EditorContext;
use std::path::{Path, PathBuf};

/// Cyclolens - cyclomatic complexity status for Go code
#[derive(Parser, Debug)]
#[command(name = "cyclolens")]
#[command(
    version,
    about = "Cyclomatic complexity and maintainability status for Go code, powered by gocyclo",
    long_about = "Cyclolens runs the gocyclo analyzer on a Go file or workspace, classifies \
every function's complexity and maintainability, and keeps a live average \
indicator in sync with your edits.\n\n\
Run without a subcommand to print the detailed report for the current directory:\n  \
cyclolens .",
    after_help = "\
Examples:
  cyclolens .                           Detailed report for current directory
  cyclolens avg main.go                 Average complexity of one file
  cyclolens details . --format json     JSON report for scripting
  cyclolens watch --file main.go        Live indicator while editing
  cyclolens doctor                      Check that gocyclo can be found"
)]
pub struct Cli {
    /// Go file or workspace folder (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Analyzer executable (overrides config and bundled binaries)
    #[arg(long, global = true, env = "CYCLOLENS_ANALYZER")]
    pub analyzer: Option<PathBuf>,

    /// Disable emoji in output (cleaner for CI logs)
    #[arg(long, global = true)]
    pub no_emoji: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the average cyclomatic complexity indicator
    #[command(after_help = "\
Examples:
  cyclolens avg main.go         Average for one file
  cyclolens avg .               Average for the whole workspace

Nothing is printed when the indicator is hidden (non-Go file, or
show_indicator = false in cyclolens.toml).")]
    Avg,

    /// Per-function complexity report with remarks
    #[command(
        alias = "run",
        after_help = "\
Examples:
  cyclolens details .                          Text report for the workspace
  cyclolens details main.go --format json      JSON for one file
  cyclolens details . -o report.txt            Write the report to a file"
    )]
    Details {
        /// Output format: text, json (default: report.format from config)
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Keep the average indicator live while files change
    #[command(after_help = "\
Saving the active file re-runs the analysis (debounced). Saving any other
file makes it the active file. Type `help` while watching for commands.")]
    Watch {
        /// File to treat as the active editor at startup
        #[arg(long)]
        file: Option<PathBuf>,

        /// Start with the indicator toggled off
        #[arg(long)]
        hidden: bool,
    },

    /// Check the environment: platform and analyzer resolution
    Doctor,

    /// Initialize a cyclolens.toml config file with example settings
    Init,

    /// Show version information
    Version,
}

/// Resolved target, project config and analyzer for one command
pub(crate) struct Session {
    /// Canonical path given on the command line
    pub target: PathBuf,
    /// Folder the target lives in (the target itself when it is a folder)
    pub workspace: PathBuf,
    pub config: ProjectConfig,
    pub invoker: ProcessInvoker,
}

impl Session {
    pub fn open(path: &Path, analyzer: Option<&Path>) -> Result<Self> {
        let target = path
            .canonicalize()
            .with_context(|| format!("Path does not exist: {}", path.display()))?;
        let workspace = if target.is_dir() {
            target.clone()
        } else {
            target
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| target.clone())
        };

        let config = load_project_config(&workspace);
        let invoker = ProcessInvoker::new(config.invoker_settings(analyzer, &workspace));

        Ok(Self {
            target,
            workspace,
            config,
            invoker,
        })
    }

    /// Editor context for a one-shot command: the target is the active
    /// file when it is a file.
    pub fn editor_context(&self) -> EditorContext {
        EditorContext {
            active_file: self.target.is_file().then(|| self.target.clone()),
            workspace: Some(self.workspace.clone()),
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

/// Run the CLI command
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Init) => init::run(&cli.path),

        Some(Commands::Doctor) => doctor::run(&cli.path, cli.analyzer.as_deref(), cli.no_emoji),

        Some(Commands::Version) => {
            println!("cyclolens {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }

        Some(Commands::Avg) => {
            let session = Session::open(&cli.path, cli.analyzer.as_deref())?;
            avg::run(&session, cli.no_emoji)
        }

        Some(Commands::Details { format, output }) => {
            let session = Session::open(&cli.path, cli.analyzer.as_deref())?;
            details::run(&session, format.as_deref(), output.as_deref())
        }

        Some(Commands::Watch { file, hidden }) => {
            let session = Session::open(&cli.path, cli.analyzer.as_deref())?;
            watch::run(&session, file.as_deref(), hidden, cli.no_emoji)
        }

        None => {
            let session = Session::open(&cli.path, cli.analyzer.as_deref())?;
            details::run(&session, None, None)
        }
    }
}
