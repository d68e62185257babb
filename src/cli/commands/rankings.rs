use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_collection, output_empty_collection, output_success, unit_label};
use crate::cli::{connect, OutputFormat};
use crate::models::Unit;
use crate::services::RankingService;

#[derive(Subcommand)]
pub enum RankingsCommands {
    #[command(about = "Recompute and store the top donors of a season")]
    Rebuild {
        #[arg(long, help = "Season id")]
        season: i64,
    },

    #[command(about = "Show the stored ranking of a season")]
    Show {
        #[arg(long, help = "Season id")]
        season: i64,
        #[arg(long)]
        unit: Option<Unit>,
    },
}

pub async fn handle(cmd: RankingsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let service = RankingService::new(connect().await?);

    match cmd {
        RankingsCommands::Rebuild { season } => {
            let stored = service.rebuild_season_rankings(season).await?;
            output_success(
                &output_format,
                &format!("Stored {} ranking row(s) for season {}", stored.len(), season),
                Some(json!({ "season_id": season, "rankings": stored })),
            )
        }
        RankingsCommands::Show { season, unit } => {
            let rows = service.stored_rankings(season, unit).await?;
            if rows.is_empty() {
                return output_empty_collection(&output_format, "rankings", &format!("No stored ranking for season {}", season));
            }
            output_collection(&output_format, "rankings", &rows, None, |r| {
                format!(
                    "{:>3}. {:<12} {:>10} ({} donations, {})",
                    r.rank,
                    r.donor_name,
                    r.total_amount,
                    r.donation_count,
                    unit_label(r.unit)
                )
            })
        }
    }
}
