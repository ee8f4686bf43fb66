//! Roadmap commands

use crate::error::{CliError, CliResult};
use crate::output::{self, print_error, print_info, print_success, print_warning, OutputFormat};
use chrono::NaiveDate;
use clap::Subcommand;
use ramp_core::{FieldEdit, RoadmapPlanner, SaveOutcome};
use ramp_types::{EpicId, PlanningPeriod, Priority, Rating, RoadmapItem, RoadmapStatus};
use serde::Serialize;
use std::str::FromStr;
use tabled::Tabled;

/// Roadmap subcommands
#[derive(Subcommand)]
pub enum RoadmapCommands {
    /// Show the selected quarter's roadmap
    Show,

    /// List epic ids committed to other quarters
    Assigned,

    /// Add and remove epics in one batch
    Plan {
        /// Epic id to add (repeatable)
        #[arg(short, long = "add", value_name = "EPIC_ID")]
        add: Vec<String>,

        /// Epic id to remove (repeatable)
        #[arg(short, long = "remove", value_name = "EPIC_ID")]
        remove: Vec<String>,

        /// Skip removal confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Rate an epic's reach, impact and confidence (0-5 stars each)
    Rate {
        /// Epic id
        epic_id: String,

        /// Reach stars
        #[arg(short, long)]
        reach: Option<u8>,

        /// Impact stars
        #[arg(short, long)]
        impact: Option<u8>,

        /// Confidence stars
        #[arg(short, long)]
        confidence: Option<u8>,
    },

    /// Set status, priority or dates on an epic
    Set {
        /// Epic id
        epic_id: String,

        /// Status (proposed, committed, to-do, in-progress, done)
        #[arg(short, long)]
        status: Option<String>,

        /// Priority (low, medium, high, critical)
        #[arg(short, long)]
        priority: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
    },

    /// Set an epic's effort rating through the capacity path
    Effort {
        /// Epic id
        epic_id: String,

        /// Effort stars, 0 to 5
        stars: u8,
    },
}

/// Table row for roadmap item display
#[derive(Debug, Serialize, Tabled)]
struct RoadmapRow {
    /// Epic ID
    epic: String,
    /// Epic name
    name: String,
    /// Reach stars
    reach: String,
    /// Impact stars
    impact: String,
    /// Confidence stars
    confidence: String,
    /// RICE score
    rice: u32,
    /// Item status
    status: String,
    /// Item priority
    priority: String,
    /// Effort stars
    effort: String,
    /// Start date
    start: String,
    /// End date
    end: String,
}

/// Unset dates render as the quarter bounds, matching how they resolve.
fn roadmap_row(item: &RoadmapItem, period: PlanningPeriod) -> RoadmapRow {
    RoadmapRow {
        epic: item.epic_id.to_string(),
        name: item.epic_name.clone(),
        reach: item.reach().stars(),
        impact: item.impact().stars(),
        confidence: item.confidence().stars(),
        rice: item.rice_score(),
        status: item.status.to_string(),
        priority: item.priority.to_string(),
        effort: item.effort_rating.stars(),
        start: item.effective_start(period).to_string(),
        end: item.effective_end(period).to_string(),
    }
}

/// Table row for assigned-elsewhere display
#[derive(Debug, Serialize, Tabled)]
struct AssignedRow {
    /// Epic ID
    epic: String,
}

fn rating(value: u8) -> CliResult<Rating> {
    Rating::new(value).map_err(|e| CliError::Invalid(e.to_string()))
}

fn date(value: &str) -> CliResult<NaiveDate> {
    value
        .parse::<NaiveDate>()
        .map_err(|_| CliError::Invalid(format!("Not a date (expected YYYY-MM-DD): {value}")))
}

/// Execute a roadmap command
pub async fn execute(
    command: RoadmapCommands,
    planner: &mut RoadmapPlanner,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        RoadmapCommands::Show => {
            planner.load().await?;
            match format {
                OutputFormat::Table => {
                    let period = planner.period();
                    let rows: Vec<RoadmapRow> = planner
                        .document()
                        .roadmap_items
                        .iter()
                        .map(|item| roadmap_row(item, period))
                        .collect();
                    output::print_output(rows, format);
                }
                OutputFormat::Json | OutputFormat::Yaml => {
                    output::print_single(planner.document(), format);
                }
            }
            Ok(())
        }

        RoadmapCommands::Assigned => {
            planner.load().await?;
            let mut ids: Vec<String> = planner
                .assigned_elsewhere()
                .iter()
                .map(|id| id.to_string())
                .collect();
            ids.sort();
            let rows: Vec<AssignedRow> = ids.into_iter().map(|epic| AssignedRow { epic }).collect();
            output::print_output(rows, format);
            Ok(())
        }

        RoadmapCommands::Plan { add, remove, yes } => {
            if add.is_empty() && remove.is_empty() {
                return Err(CliError::Invalid(
                    "Nothing to change; pass --add and/or --remove".into(),
                ));
            }

            planner.load().await?;

            if !remove.is_empty() && !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Remove {} epic(s) from the {} roadmap?",
                        remove.len(),
                        planner.period()
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or(false);

                if !confirm {
                    print_error("Aborted");
                    return Ok(());
                }
            }

            print_info(&format!("Editing roadmap for {}", planner.period()));
            planner.enter_edit()?;
            for id in &add {
                planner.add_epic(&EpicId::from(id.as_str()))?;
            }
            for id in &remove {
                planner.remove_epic(&EpicId::from(id.as_str()))?;
            }

            match planner.save_edits().await? {
                SaveOutcome::Saved => {
                    print_success(&format!(
                        "Roadmap saved: {} item(s) on {}",
                        planner.document().roadmap_items.len(),
                        planner.period()
                    ));
                    Ok(())
                }
                SaveOutcome::Conflict(message) => {
                    print_error(&message);
                    std::process::exit(1);
                }
                SaveOutcome::Failed(message) => {
                    print_error(&message);
                    std::process::exit(1);
                }
            }
        }

        RoadmapCommands::Rate {
            epic_id,
            reach,
            impact,
            confidence,
        } => {
            let mut edits = Vec::new();
            if let Some(value) = reach {
                edits.push(FieldEdit::Reach(rating(value)?));
            }
            if let Some(value) = impact {
                edits.push(FieldEdit::Impact(rating(value)?));
            }
            if let Some(value) = confidence {
                edits.push(FieldEdit::Confidence(rating(value)?));
            }
            if edits.is_empty() {
                return Err(CliError::Invalid(
                    "Pass at least one of --reach, --impact, --confidence".into(),
                ));
            }

            planner.load().await?;
            let epic = EpicId::from(epic_id.as_str());
            for edit in edits {
                if !apply_autosave(planner.update_field(&epic, edit).await?) {
                    return Ok(());
                }
            }
            if let Some(item) = planner.document().item(&epic) {
                print_success(&format!("Updated {}: RICE score {}", epic, item.rice_score()));
            }
            Ok(())
        }

        RoadmapCommands::Set {
            epic_id,
            status,
            priority,
            start,
            end,
        } => {
            let mut edits = Vec::new();
            if let Some(value) = status {
                let status = RoadmapStatus::from_str(&value)
                    .map_err(|e| CliError::Invalid(e.to_string()))?;
                edits.push(FieldEdit::Status(status));
            }
            if let Some(value) = priority {
                let priority =
                    Priority::from_str(&value).map_err(|e| CliError::Invalid(e.to_string()))?;
                edits.push(FieldEdit::Priority(priority));
            }
            if let Some(value) = start {
                edits.push(FieldEdit::StartDate(Some(date(&value)?)));
            }
            if let Some(value) = end {
                edits.push(FieldEdit::EndDate(Some(date(&value)?)));
            }
            if edits.is_empty() {
                return Err(CliError::Invalid(
                    "Pass at least one of --status, --priority, --start, --end".into(),
                ));
            }

            planner.load().await?;
            let epic = EpicId::from(epic_id.as_str());
            for edit in edits {
                if !apply_autosave(planner.update_field(&epic, edit).await?) {
                    return Ok(());
                }
            }
            print_success(&format!("Updated {}", epic));
            Ok(())
        }

        RoadmapCommands::Effort { epic_id, stars } => {
            planner.load().await?;
            let epic = EpicId::from(epic_id.as_str());
            let confirmed = planner.update_effort_rating(&epic, rating(stars)?).await?;
            print_success(&format!("Effort for {}: {}", epic, confirmed.stars()));
            Ok(())
        }
    }
}

/// Reports one autosave outcome. Conflicts and failures are not fatal:
/// the planner has already rolled back to server state, so the command
/// still exits zero. Returns whether to keep going.
fn apply_autosave(outcome: SaveOutcome) -> bool {
    match outcome {
        SaveOutcome::Saved => true,
        SaveOutcome::Conflict(message) => {
            print_warning(&message);
            false
        }
        SaveOutcome::Failed(message) => {
            print_warning(&format!("Save failed, change rolled back: {message}"));
            false
        }
    }
}
