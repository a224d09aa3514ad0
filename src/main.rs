//! Taskboard - mirror task branch workflow onto a kanban board.
//!
//! Derives the state of every task branch from git history and reconciles
//! the board so there is one card per task.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use taskboard::core::Config;
use taskboard::git::{GitCli, GitRepository};
use taskboard::sync::{self, Plan};
use taskboard::DescriptionTemplate;

/// Mirror task branch workflow onto a kanban board
#[derive(Parser)]
#[command(name = "taskboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of searching for one
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the remote and reconcile the board
    Sync {
        /// JSON file with the board API credentials
        credentials: Option<String>,

        /// Print the mutations without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the derived state of every task branch
    Status {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show the effective configuration
    Config {
        /// Print the config file path instead
        #[arg(short, long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG wins over --verbose
    let level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Sync { credentials, dry_run } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_sync(&config, credentials.as_deref(), dry_run)?;
        }
        Commands::Status { format } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_status(&config, format)?;
        }
        Commands::Config { path } => {
            cmd_config(cli.config.as_deref(), path)?;
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
        }
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::load_from_file(path),
        None => Config::load(),
    }
}

/// Open the repository around the current directory.
fn open_repository(config: &Config) -> Result<(GitCli, DescriptionTemplate)> {
    let repo = taskboard::git::discover_repo().context("Not inside a git repository")?;
    let root = repo.root().context("Bare repositories are not supported")?;
    let template = description_template(config, &repo);
    Ok((GitCli::new(root, config.repository.remote.clone()), template))
}

fn description_template(config: &Config, repo: &GitRepository) -> DescriptionTemplate {
    DescriptionTemplate::from_config(&config.description, repo.web_url(&config.repository.remote))
}

/// Fetch and reconcile the board.
#[cfg(feature = "trello")]
fn cmd_sync(config: &Config, credentials: Option<&str>, dry_run: bool) -> Result<()> {
    use taskboard::{InMemoryBoard, TrelloBoard, TrelloCredentials};

    let (git, template) = open_repository(config)?;

    let credentials_path = credentials
        .map(|p| shellexpand::full(p).map(|p| PathBuf::from(p.as_ref())))
        .transpose()
        .context("Failed to expand credentials path")?;
    let credentials = TrelloCredentials::resolve(credentials_path.as_deref())?;
    let mut board = TrelloBoard::connect(&config.board, credentials)?;

    let report = if dry_run {
        let mut snapshot = InMemoryBoard::snapshot_of(&board)?;
        sync::sync(&git, &mut snapshot, &config.repository, template)?
    } else {
        sync::sync(&git, &mut board, &config.repository, template)?
    };

    let mut stdout = io::stdout().lock();
    write!(stdout, "{report}")?;
    if dry_run && !report.is_noop() {
        writeln!(stdout, "(dry run: {} mutations not applied)", report.mutations.len())?;
    }
    Ok(())
}

#[cfg(not(feature = "trello"))]
fn cmd_sync(_config: &Config, _credentials: Option<&str>, _dry_run: bool) -> Result<()> {
    anyhow::bail!("Board support not compiled in. Rebuild with --features trello")
}

/// Print the derived state of every task branch.
fn cmd_status(config: &Config, format: OutputFormat) -> Result<()> {
    let (git, template) = open_repository(config)?;
    let plan = sync::plan(&git, &config.repository, template)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Text => print_plan(&plan),
    }
    Ok(())
}

fn print_plan(plan: &Plan) {
    if plan.cards.is_empty() {
        println!("No task branches");
        return;
    }

    for card in &plan.cards {
        let bucket = card.bucket.map_or("-".to_string(), |b| b.to_string());
        println!(
            "{:<32} {:<22} {:>7} {}",
            card.task.name,
            card.task.state.to_string(),
            card.task.complexity,
            bucket
        );
    }

    if let Some(t) = plan.thresholds {
        println!();
        println!("Thresholds: medium {:.1}, high {:.1}", t.medium, t.high);
    }

    for warning in plan.warnings() {
        println!("warning: {warning}");
    }
}

/// Show configuration.
fn cmd_config(explicit: Option<&Path>, show_path: bool) -> Result<()> {
    if show_path {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(Config::find_file)
            .or_else(|| Config::config_dir().map(|d| d.join("config.toml")));
        if let Some(path) = path {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let config = load_config(explicit)?;
    let toml = toml::to_string_pretty(&config)?;
    println!("{toml}");

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "taskboard", &mut io::stdout());
}
