pub mod directory;
pub mod maintenance;
pub mod ranking;

pub use directory::{month_window, DirectoryService};
pub use maintenance::MaintenanceService;
pub use ranking::{aggregate, bar_percent, RankingEntry, RankingService, UnitFilter, VIP_THRESHOLD};
