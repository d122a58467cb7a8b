use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use taskpulse::commands::*;
use taskpulse::models::Priority;
use taskpulse::storage::{data_dir, FileStore, DATA_DIR_ENV};
use taskpulse::store::{EditRequest, TaskStore};
use taskpulse::tui::run_tui;

#[derive(Parser)]
#[command(name = "taskpulse")]
#[command(about = "Task list with priorities, due dates and a weekly completion chart", long_about = None)]
struct Cli {
    /// Directory holding tasks.json, stats.json and theme.json
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Log debug output (overrides RUST_LOG); the TUI logs to taskpulse.log in the data directory
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task text (quoted if it has spaces)
        text: String,
        /// low, medium or high
        #[arg(short, long, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Due date in YYYY-MM-DD
        #[arg(short, long)]
        due: Option<String>,
    },
    /// List tasks by priority and due date
    List {
        /// Hide completed tasks
        #[arg(short, long)]
        pending: bool,
    },
    /// Mark a task complete, or reopen it
    Toggle {
        index: usize,
    },
    /// Edit a task
    Edit {
        index: usize,
        /// New task text
        #[arg(short, long)]
        text: Option<String>,
        /// New priority (low, medium, high)
        #[arg(short, long)]
        priority: Option<String>,
        /// New due date in YYYY-MM-DD; pass "" to clear it
        #[arg(short, long)]
        due: Option<String>,
    },
    /// Remove a task
    Remove {
        index: usize,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Show completions for the last seven days
    Stats,
    /// Show or change the colour theme (dark, light, toggle)
    Theme {
        choice: Option<String>,
    },
    /// Delete all tasks and completion stats
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

/// File the TUI logs to, so log lines never land on the alternate screen.
const LOG_FILE: &str = "taskpulse.log";

fn init_logging(verbose: bool, log_file: Option<&Path>) -> io::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let writer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(log_file.is_none())
        .with_writer(writer)
        .init();
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "taskpulse", &mut io::stdout());
        return Ok(());
    }

    let port = FileStore::new(data_dir(cli.data_dir));
    let tui = matches!(cli.command, Some(Commands::Ui) | None);
    let log_file = tui.then(|| port.dir().join(LOG_FILE));
    init_logging(cli.verbose, log_file.as_deref()).context("Failed to set up logging")?;

    let dir = port.dir().to_path_buf();
    let mut store = TaskStore::open(port).with_context(|| format!("Failed to open task data in {}", dir.display()))?;

    match cli.command {
        Some(Commands::Add { text, priority, due }) => cmd_add(&mut store, &text, priority, due.as_deref()),
        Some(Commands::List { pending }) => cmd_list(&store, pending),
        Some(Commands::Toggle { index }) => cmd_toggle(&mut store, index),
        Some(Commands::Edit { index, text, priority, due }) => cmd_edit(
            &mut store,
            index,
            EditRequest {
                text,
                priority,
                due_date: due,
            },
        ),
        Some(Commands::Remove { index, force }) => cmd_remove(&mut store, index, force),
        Some(Commands::Stats) => cmd_stats(&store),
        Some(Commands::Theme { choice }) => cmd_theme(&mut store, choice.as_deref()),
        Some(Commands::Reset { force }) => cmd_reset(&mut store, force),
        Some(Commands::Completions { .. }) => Ok(()),
        Some(Commands::Ui) | None => run_tui(store).context("Error running TUI"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
