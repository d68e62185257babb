pub mod commands;
pub mod utils;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::store::Store;

#[derive(Parser)]
#[command(name = "rg-admin")]
#[command(about = "RG Family maintenance CLI - one-off record operations against the hosted store")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Organization roster maintenance")]
    Members {
        #[command(subcommand)]
        cmd: commands::members::MembersCommands,
    },

    #[command(about = "Donation maintenance")]
    Donations {
        #[command(subcommand)]
        cmd: commands::donations::DonationsCommands,
    },

    #[command(about = "Signature gallery")]
    Signatures {
        #[command(subcommand)]
        cmd: commands::signatures::SignaturesCommands,
    },

    #[command(about = "Broadcast schedule")]
    Schedules {
        #[command(subcommand)]
        cmd: commands::schedules::SchedulesCommands,
    },

    #[command(about = "Season donation rankings")]
    Rankings {
        #[command(subcommand)]
        cmd: commands::rankings::RankingsCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Open the configured record store. Missing credentials are fatal.
pub async fn connect() -> anyhow::Result<Store> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    Store::from_config(&config).await.context("failed to open record store")
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Members { cmd } => commands::members::handle(cmd, output_format).await,
        Commands::Donations { cmd } => commands::donations::handle(cmd, output_format).await,
        Commands::Signatures { cmd } => commands::signatures::handle(cmd, output_format).await,
        Commands::Schedules { cmd } => commands::schedules::handle(cmd, output_format).await,
        Commands::Rankings { cmd } => commands::rankings::handle(cmd, output_format).await,
    }
}
