use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_collection, output_empty_collection, output_error, output_success};
use crate::cli::{connect, OutputFormat};
use crate::models::Unit;
use crate::services::{DirectoryService, MaintenanceService};

#[derive(Subcommand)]
pub enum MembersCommands {
    #[command(about = "List organization members")]
    List {
        #[arg(long, help = "Only this unit (excel or crew)")]
        unit: Option<Unit>,
        #[arg(long, help = "Only active (true) or inactive (false) members")]
        active: Option<bool>,
    },

    #[command(about = "Set the role of the members matching name and unit")]
    SetRole {
        #[arg(long)]
        name: String,
        #[arg(long)]
        unit: Unit,
        #[arg(long, help = "Organization role, e.g. 대표")]
        role: String,
    },

    #[command(about = "Activate the member matching name and role at a display position")]
    Activate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: String,
        #[arg(long, help = "Display position within the unit")]
        order: i32,
    },
}

pub async fn handle(cmd: MembersCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = connect().await?;

    match cmd {
        MembersCommands::List { unit, active } => {
            let members = DirectoryService::new(store).members(unit, active).await?;
            if members.is_empty() {
                return output_empty_collection(&output_format, "members", "No members found");
            }
            output_collection(&output_format, "members", &members, None, |m| {
                let status = if m.is_active { "active" } else { "inactive" };
                format!("{:>4}  {:<6} {:<10} {:<8} #{} {}", m.id, m.unit.as_str(), m.name, m.role, m.position_order, status)
            })
        }
        MembersCommands::SetRole { name, unit, role } => {
            let updated = MaintenanceService::new(store).set_member_role(&name, unit, &role).await?;
            if updated.is_empty() {
                return output_error(&output_format, &format!("No {} member named '{}'", unit, name), Some("NOT_FOUND"));
            }
            output_success(
                &output_format,
                &format!("Set role of '{}' ({}) to {}", name, unit, role),
                Some(json!({ "members": updated })),
            )
        }
        MembersCommands::Activate { name, role, order } => {
            let updated = MaintenanceService::new(store).activate_member(&name, &role, order).await?;
            if updated.is_empty() {
                return output_error(&output_format, &format!("No member named '{}' with role {}", name, role), Some("NOT_FOUND"));
            }
            output_success(
                &output_format,
                &format!("Activated '{}' at position {}", name, order),
                Some(json!({ "members": updated })),
            )
        }
    }
}
