use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::{connect, OutputFormat};
use crate::services::MaintenanceService;

#[derive(Subcommand)]
pub enum DonationsCommands {
    #[command(about = "Delete every donation of a season (irreversible)")]
    Purge {
        #[arg(long, help = "Season id")]
        season: i64,
    },
}

pub async fn handle(cmd: DonationsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = connect().await?;

    match cmd {
        DonationsCommands::Purge { season } => {
            let removed = MaintenanceService::new(store).purge_season_donations(season).await?;
            output_success(
                &output_format,
                &format!("Deleted {} donation(s) from season {}", removed.len(), season),
                Some(json!({ "season_id": season, "deleted": removed.len() })),
            )
        }
    }
}
