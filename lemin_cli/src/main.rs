//! # lem-in
//!
//! Command line host for the lem-in colony solver.
//!
//! ## Commands
//!
//! - `lem-in run <FILE>` - Print the colony and the moves of every turn
//! - `lem-in visualize <FILE>` - Step through the turns in the terminal
//! - `lem-in serve [FILE]` - Serve colonies as JSON to the browser visualizer

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use lemin_engine::{LemInError, SolveOptions};
use std::path::PathBuf;

mod commands;
mod server;

/// Moves an ant colony from its start room to its end room in as few turns as possible
#[derive(Parser)]
#[command(name = "lem-in")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "LEMIN_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a colony and print the moves
    #[command(name = "run")]
    Run {
        /// Colony file (.txt)
        file: PathBuf,

        /// Write a JSON replay of the simulation to this path
        #[arg(long, value_name = "PATH")]
        replay: Option<PathBuf>,

        #[command(flatten)]
        limits: Limits,
    },

    /// Step through the solution of a colony in the terminal
    #[command(name = "visualize")]
    Visualize {
        /// Colony file (.txt)
        file: PathBuf,

        #[command(flatten)]
        limits: Limits,
    },

    /// Serve solutions to the browser visualizer
    #[command(name = "serve")]
    Serve {
        /// Colony file printed on startup and served when a request names none
        file: Option<PathBuf>,

        /// Listen address
        #[arg(long, env = "LEMIN_ADDR", default_value = "127.0.0.1:8080")]
        addr: String,

        /// Directory holding the static web files
        #[arg(long, env = "LEMIN_WEB_DIR", default_value = "web")]
        web_dir: PathBuf,

        /// Deadline for solving one colony, in milliseconds
        #[arg(long, env = "LEMIN_TIMEOUT_MS", default_value_t = 5000)]
        timeout_ms: u64,

        #[command(flatten)]
        limits: Limits,
    },
}

/// Bounds on the work spent solving one colony
#[derive(Args)]
struct Limits {
    /// Give up when start and end are linked by more routes than this
    #[arg(long, env = "LEMIN_MAX_ROUTES")]
    max_routes: Option<usize>,

    /// Reject colonies holding more ants than this
    #[arg(long, env = "LEMIN_MAX_ANTS")]
    max_ants: Option<usize>,
}

impl From<Limits> for SolveOptions {
    fn from(limits: Limits) -> Self {
        SolveOptions {
            max_routes: limits.max_routes,
            max_ants: limits.max_ants,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli.log_level)?;

    let result = match cli.command {
        Commands::Run {
            file,
            replay,
            limits,
        } => commands::run(&file, &limits.into(), replay),
        Commands::Visualize { file, limits } => commands::visualize(&file, &limits.into()),
        Commands::Serve {
            file,
            addr,
            web_dir,
            timeout_ms,
            limits,
        } => commands::serve(file, &addr, web_dir, timeout_ms, limits.into()).await,
    };

    // Bad colonies are reported on stdout like the moves would have been
    if let Err(e) = &result {
        if let Some(error) = e.downcast_ref::<LemInError>() {
            println!("ERROR: invalid data format, {}", error);
            std::process::exit(1);
        }
    }

    result
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
