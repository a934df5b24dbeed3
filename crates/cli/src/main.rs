//! RoboTutor CLI: the main entry point.
//!
//! Commands:
//! - `serve`   Start the HTTP tutoring server
//! - `ask`     Ask a single question, optionally about a PDF
//! - `levels`  Print the five complexity levels and their prompts
//! - `status`  Show resolved configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "robotutor",
    about = "RoboTutor: level-adaptive AI tutoring with PDF context",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Config file (defaults to ~/.robotutor/config.toml)
        #[arg(short, long, env = "ROBOTUTOR_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Ask one question and print the answer
    Ask {
        /// Complexity level, 1 (child) to 5 (doctoral)
        #[arg(short, long, default_value = "3")]
        level: String,

        /// PDF to ask about
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Config file (defaults to ~/.robotutor/config.toml)
        #[arg(short, long, env = "ROBOTUTOR_CONFIG")]
        config: Option<PathBuf>,

        /// The question
        prompt: String,
    },

    /// List complexity levels
    Levels,

    /// Show resolved configuration
    Status {
        /// Config file (defaults to ~/.robotutor/config.toml)
        #[arg(short, long, env = "ROBOTUTOR_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port, config } => commands::serve::run(port, config).await?,
        Commands::Ask {
            level,
            file,
            config,
            prompt,
        } => commands::ask::run(prompt, level, file, config).await?,
        Commands::Levels => commands::levels::run(),
        Commands::Status { config } => commands::status::run(config)?,
    }

    Ok(())
}
