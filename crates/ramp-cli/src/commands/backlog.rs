//! Backlog commands

use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use clap::Subcommand;
use ramp_core::RoadmapPlanner;
use ramp_types::EpicFilter;
use serde::Serialize;
use std::collections::HashSet;
use tabled::Tabled;

/// Backlog subcommands
#[derive(Subcommand)]
pub enum BacklogCommands {
    /// List epics available for the selected quarter
    List {
        /// Case-insensitive name search
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by theme name
        #[arg(short, long)]
        theme: Option<String>,

        /// Filter by initiative name
        #[arg(short, long)]
        initiative: Option<String>,

        /// Filter by track
        #[arg(short = 'T', long)]
        track: Option<String>,

        /// Include epics already assigned to other quarters
        #[arg(short, long)]
        all: bool,
    },
}

/// Table row for epic display
#[derive(Debug, Serialize, Tabled)]
struct EpicRow {
    /// Epic ID
    id: String,
    /// Epic name
    name: String,
    /// Theme name
    theme: String,
    /// Initiative name
    initiative: String,
    /// Delivery track
    track: String,
    /// Whether the epic is committed to another quarter
    assigned: String,
}

/// Execute a backlog command
pub async fn execute(
    command: BacklogCommands,
    planner: &mut RoadmapPlanner,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        BacklogCommands::List {
            search,
            theme,
            initiative,
            track,
            all,
        } => {
            planner.load().await?;

            let mut filter = EpicFilter::default();
            if let Some(needle) = search {
                filter = filter.with_search(needle);
            }
            if let Some(theme) = theme {
                filter = filter.with_theme(theme);
            }
            if let Some(initiative) = initiative {
                filter = filter.with_initiative(initiative);
            }
            if let Some(track) = track {
                filter = filter.with_track(track);
            }

            let epics = if all {
                // Same filter, no exclusion.
                ramp_types::available_epics(planner.backlog(), &HashSet::new(), &filter)
            } else {
                planner.available_epics(&filter)
            };

            let assigned_ids = planner.assigned_elsewhere();
            let rows: Vec<EpicRow> = epics
                .into_iter()
                .map(|epic| {
                    let assigned = if assigned_ids.contains(&epic.id) {
                        "other quarter".to_string()
                    } else {
                        String::new()
                    };
                    EpicRow {
                        id: epic.id.to_string(),
                        name: epic.name,
                        theme: epic.theme_name.unwrap_or_default(),
                        initiative: epic.initiative_name.unwrap_or_default(),
                        track: epic.track.unwrap_or_default(),
                        assigned,
                    }
                })
                .collect();
            output::print_output(rows, format);
            Ok(())
        }
    }
}
