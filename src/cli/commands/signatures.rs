use clap::Subcommand;

use crate::cli::utils::{output_collection, output_empty_collection};
use crate::cli::{connect, OutputFormat};
use crate::models::Unit;
use crate::services::DirectoryService;

#[derive(Subcommand)]
pub enum SignaturesCommands {
    #[command(about = "List signatures by number, with the total count")]
    List {
        #[arg(long)]
        unit: Option<Unit>,
        #[arg(long, help = "Maximum rows to show")]
        limit: Option<u32>,
    },
}

pub async fn handle(cmd: SignaturesCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = connect().await?;

    match cmd {
        SignaturesCommands::List { unit, limit } => {
            let selected = DirectoryService::new(store).signatures(unit, limit).await?;
            if selected.rows.is_empty() {
                return output_empty_collection(&output_format, "signatures", "No signatures found");
            }
            output_collection(&output_format, "signatures", &selected.rows, selected.total_count, |s| {
                format!("#{:<4} {:<6} {}", s.sig_number, s.unit.as_str(), s.title)
            })
        }
    }
}
