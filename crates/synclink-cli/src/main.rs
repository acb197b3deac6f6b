//! Synclink CLI
//!
//! Developer tool for scaffolding projects and running setup plans.

use anyhow::Result;
use clap::{Parser, Subcommand};
use synclink_core::config::LINK_TOKEN_ENV;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Synclink - connect a data source and configure a sync
#[derive(Parser)]
#[command(name = "synclink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "synclink.yaml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new Synclink project
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Project name (defaults to directory name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Validate configuration without calling the backend
    Validate {
        /// Configuration profile to use (e.g., staging, prod)
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Run a setup plan through the wizard
    Connect {
        /// Setup plan file
        plan: String,

        /// Use an in-memory backend instead of the configured API
        #[arg(long)]
        dry_run: bool,

        /// Configuration profile to use (e.g., staging, prod)
        #[arg(short, long)]
        profile: Option<String>,

        /// Link token for this session
        #[arg(long, env = LINK_TOKEN_ENV, hide_env_values = true)]
        link_token: Option<String>,
    },

    /// Inspect configured sources
    Sources {
        #[command(subcommand)]
        command: SourcesCommands,
    },
}

#[derive(Subcommand)]
enum SourcesCommands {
    /// List sources already configured for this link token
    List {
        /// Use an in-memory backend instead of the configured API
        #[arg(long)]
        dry_run: bool,

        /// Configuration profile to use (e.g., staging, prod)
        #[arg(short, long)]
        profile: Option<String>,

        /// Link token for this session
        #[arg(long, env = LINK_TOKEN_ENV, hide_env_values = true)]
        link_token: Option<String>,

        /// Print sources as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Init { path, name } => {
            commands::init::run(&path, name.as_deref()).await?;
        }
        Commands::Validate { profile } => {
            commands::validate::run(&cli.config, profile.as_deref()).await?;
        }
        Commands::Connect {
            plan,
            dry_run,
            profile,
            link_token,
        } => {
            let backend = commands::Backend {
                dry_run,
                profile: profile.as_deref(),
                link_token,
            };
            commands::connect::run(&cli.config, &plan, backend).await?;
        }
        Commands::Sources { command } => match command {
            SourcesCommands::List {
                dry_run,
                profile,
                link_token,
                json,
            } => {
                let backend = commands::Backend {
                    dry_run,
                    profile: profile.as_deref(),
                    link_token,
                };
                commands::sources::list(&cli.config, backend, json).await?;
            }
        },
    }

    Ok(())
}
