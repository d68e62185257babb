use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_collection, output_empty_collection, output_success, unit_label};
use crate::cli::{connect, OutputFormat};
use crate::models::{NewScheduleEvent, Unit};
use crate::services::{DirectoryService, MaintenanceService};

#[derive(Subcommand)]
pub enum SchedulesCommands {
    #[command(about = "Insert schedule events from a YAML list")]
    Seed {
        #[arg(help = "YAML file with a list of events")]
        file: PathBuf,
    },

    #[command(about = "List schedule events, earliest first")]
    List {
        #[arg(long)]
        unit: Option<Unit>,
    },
}

/// Parse a YAML sequence of schedule events.
pub fn parse_events(source: &str) -> anyhow::Result<Vec<NewScheduleEvent>> {
    serde_yaml::from_str(source).context("invalid schedule YAML")
}

pub async fn handle(cmd: SchedulesCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SchedulesCommands::Seed { file } => {
            let source = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let events = parse_events(&source)?;

            let store = connect().await?;
            let inserted = MaintenanceService::new(store).seed_schedules(&events).await?;
            output_success(
                &output_format,
                &format!("Inserted {} event(s) from {}", inserted.len(), file.display()),
                Some(json!({ "schedules": inserted })),
            )
        }
        SchedulesCommands::List { unit } => {
            let store = connect().await?;
            let events = DirectoryService::new(store).schedules(unit, None, None).await?;
            if events.is_empty() {
                return output_empty_collection(&output_format, "schedules", "No events scheduled");
            }
            output_collection(&output_format, "schedules", &events, None, |e| {
                format!(
                    "{}  {:<6} {:<9} {}",
                    e.start_datetime.format("%Y-%m-%d %H:%M"),
                    unit_label(e.unit),
                    e.event_type.as_str(),
                    e.title
                )
            })
        }
    }
}
