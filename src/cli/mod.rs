//! CLI module for TaskTrack
//!
//! Provides command-line interface parsing and handling for the tasktrack-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod report;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// TaskTrack - Task tracking server
///
/// A REST task tracker with bearer-token authentication and
/// ownership-based authorization.
#[derive(Parser, Debug)]
#[command(
    name = "tasktrack-server",
    version,
    about = "TaskTrack - Task tracking server with token authentication",
    long_about = "A REST task tracker. Users log in with email and password and receive a\n\
                  signed bearer token; task authors edit their tasks, executors change status.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a new project.",
    after_help = "EXAMPLES:\n    \
                  tasktrack-server init                  # Scaffold tasktrack.toml and .env\n    \
                  tasktrack-server secret                # Print a fresh signing secret\n    \
                  tasktrack-server config --validate     # Check the configuration\n    \
                  tasktrack-server                       # Start the server (requires tasktrack.toml)\n    \
                  tasktrack-server --config my.toml      # Use a custom config file"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "tasktrack.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new TaskTrack project
    ///
    /// Creates tasktrack.toml, a .env file holding a freshly generated
    /// signing secret, and the data/ directory.
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "3000")]
        port: u16,
    },

    /// Print a new random token signing secret
    Secret,

    /// Show configuration information
    Config {
        /// Validate the configuration file, including the signing secret
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
