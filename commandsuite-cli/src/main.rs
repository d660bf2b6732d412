use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod core;
mod document;
mod refactor;

use crate::core::output::OutputFormat;

#[derive(Parser)]
#[command(name = "cmdsuite")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Interactive refactoring for script files",
    long_about = "Command suite host - offers the refactors that apply at a position in a \
                  script file, lets you pick one from a terminal menu and applies its edits."
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, text)
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Config file to use instead of the global/project lookup
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick a refactor at a position and apply it
    Refactor {
        /// Location in format file:line:column
        location: String,

        /// Selected range in format line:column-line:column
        #[arg(short, long)]
        select: Option<String>,

        /// Show the resulting diff without writing the file
        #[arg(long)]
        dry_run: bool,
    },

    /// List the refactors that apply at a position
    List {
        /// Location in format file:line:column
        location: String,

        /// Selected range in format line:column-line:column
        #[arg(short, long)]
        select: Option<String>,
    },

    /// Print a script file with syntax highlighting
    Render {
        /// File to print
        file: PathBuf,
    },

    /// Write a default config file
    InitConfig {
        /// Destination (defaults to ./commandsuite.toml)
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so the menu owns stdout
    let filter = if cli.verbose {
        "commandsuite=debug,cmdsuite=debug"
    } else {
        "commandsuite=info,cmdsuite=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let runtime = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Refactor {
            location,
            select,
            dry_run,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::refactor::run(&runtime, &location, select.as_deref(), dry_run, config)?;
        }
        Commands::List { location, select } => {
            let config = commands::load_config(cli.config.as_deref())?;
            runtime.block_on(commands::list::run(
                &location,
                select.as_deref(),
                cli.format,
                config,
            ))?;
        }
        Commands::Render { file } => {
            runtime.block_on(commands::render::run(&file))?;
        }
        Commands::InitConfig { path } => {
            commands::init_config::run(path)?;
        }
    }

    Ok(())
}
