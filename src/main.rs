use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use promptsmith::config::{Config, ENV_API_URL};

mod cmd;

#[derive(Parser)]
#[command(name = "promptsmith")]
#[command(version, about = "Guided-interview generator for AI project prompts")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip confirmation prompts and take the defaults
    #[arg(long, global = true)]
    pub yes: bool,

    /// Override the service base URL for this invocation
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a new guided interview
    Start {
        /// Project idea; prompted for interactively when omitted
        #[arg(short, long)]
        idea: Option<String>,

        /// Number of questions to ask (defaults to the configured value)
        #[arg(short, long)]
        questions: Option<usize>,

        /// Comma-separated phase list, e.g. "Core Features,Tech Stack"
        #[arg(long)]
        phases: Option<String>,

        /// Write the final prompt to this file as well as the terminal
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Resume a saved interview by its id
    Resume {
        id: String,

        /// Write the final prompt to this file as well as the terminal
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List saved interviews on the service
    List,
    /// Delete a saved interview
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Initialize a default promptsmith.toml file
    Init,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "promptsmith=debug" } else { "promptsmith=warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let mut config = Config::load(&cwd)?;
    if let Some(url) = cli.api_url.clone() {
        config.service.url = url;
    }
    tracing::debug!(url = %config.service.url, "resolved service URL ({} overrides file)", ENV_API_URL);

    match &cli.command {
        Commands::Start {
            idea,
            questions,
            phases,
            output,
        } => {
            cmd::cmd_start(
                &config,
                idea.clone(),
                *questions,
                phases.clone(),
                output.clone(),
                cli.yes,
            )
            .await?;
        }
        Commands::Resume { id, output } => {
            cmd::cmd_resume(&config, id, output.clone(), cli.yes).await?;
        }
        Commands::List => cmd::cmd_list(&config).await?,
        Commands::Delete { id, force } => {
            cmd::cmd_delete(&config, id, *force || cli.yes).await?;
        }
        Commands::Config { command } => match command.clone().unwrap_or(ConfigCommands::Show) {
            ConfigCommands::Show => cmd::cmd_config_show(&config)?,
            ConfigCommands::Init => cmd::cmd_config_init()?,
        },
    }

    Ok(())
}
