//! Capacity planning commands

use crate::error::{CliError, CliResult};
use crate::output::{self, print_header, print_info, print_success, print_warning, OutputFormat};
use clap::Subcommand;
use ramp_core::{CapacityStore, RoadmapPlanner};
use ramp_types::{CapacityPlan, EffortBands};
use serde::Serialize;
use std::sync::Arc;
use tabled::Tabled;

/// Capacity subcommands
#[derive(Subcommand)]
pub enum CapacityCommands {
    /// Show the selected quarter's capacity plan
    Show,

    /// Derive roadmap effort ratings from capacity totals
    Sync {
        /// Override band edges as four comma-separated maxima
        #[arg(long, value_name = "S1,S2,S3,S4")]
        star_maxes: Option<String>,

        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Table row for team display
#[derive(Debug, Serialize, Tabled)]
struct TeamRow {
    /// Team ID
    id: String,
    /// Team name
    name: String,
    /// Whether the team takes part in planning
    active: String,
    /// Effort recorded against the team
    effort: u32,
}

/// Table row for per-epic effort totals
#[derive(Debug, Serialize, Tabled)]
struct EffortRow {
    /// Epic ID
    epic: String,
    /// Total effort across teams
    total: u32,
    /// Star band the total falls into
    band: String,
}

fn parse_star_maxes(spec: &str) -> CliResult<EffortBands> {
    let parts: Vec<u32> = spec
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|_| CliError::Invalid(format!("Not four numbers: {spec}")))?;
    let [star1_max, star2_max, star3_max, star4_max] = parts[..] else {
        return Err(CliError::Invalid(format!(
            "Expected four comma-separated maxima, got {}",
            parts.len()
        )));
    };
    if !(star1_max <= star2_max && star2_max <= star3_max && star3_max <= star4_max) {
        return Err(CliError::Invalid(format!(
            "Band maxima must not decrease: {spec}"
        )));
    }
    Ok(EffortBands {
        star1_max,
        star2_max,
        star3_max,
        star4_max,
    })
}

fn effort_rows(plan: &CapacityPlan, bands: &EffortBands) -> Vec<EffortRow> {
    plan.aggregate_epic_efforts()
        .into_iter()
        .map(|(epic, total)| EffortRow {
            epic: epic.to_string(),
            total,
            band: if total == 0 {
                String::new()
            } else {
                bands.star_rating(total).stars()
            },
        })
        .collect()
}

/// Execute a capacity command
pub async fn execute(
    command: CapacityCommands,
    planner: &mut RoadmapPlanner,
    store: Arc<dyn CapacityStore>,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        CapacityCommands::Show => {
            let plan = store
                .capacity_plan(planner.product(), planner.period())
                .await?;
            let Some(plan) = plan else {
                print_warning(&format!("No capacity plan for {}", planner.period()));
                return Ok(());
            };

            match format {
                OutputFormat::Table => {
                    print_header(&format!(
                        "Capacity plan for {} (unit: {})",
                        plan.period(),
                        plan.effort_unit
                    ));
                    let teams: Vec<TeamRow> = plan
                        .teams
                        .iter()
                        .map(|team| TeamRow {
                            id: team.id.to_string(),
                            name: team.name.clone(),
                            active: if team.is_active { "yes" } else { "no" }.to_string(),
                            effort: plan.total_effort_for_team(team.id),
                        })
                        .collect();
                    output::print_output(teams, format);

                    let bands = EffortBands::default_for(plan.effort_unit);
                    output::print_output(effort_rows(&plan, &bands), format);
                }
                OutputFormat::Json | OutputFormat::Yaml => {
                    output::print_single(&plan, format);
                }
            }
            Ok(())
        }

        CapacityCommands::Sync { star_maxes, yes } => {
            let plan = store
                .capacity_plan(planner.product(), planner.period())
                .await?;
            let Some(plan) = plan else {
                print_warning(&format!("No capacity plan for {}", planner.period()));
                return Ok(());
            };
            let bands = match star_maxes {
                Some(spec) => parse_star_maxes(&spec)?,
                None => EffortBands::default_for(plan.effort_unit),
            };

            if !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Derive effort ratings from {} capacity totals?",
                        planner.period()
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or(false);

                if !confirm {
                    print_info("Aborted");
                    return Ok(());
                }
            }

            planner.load().await?;
            let applied = planner.sync_effort_ratings(&bands).await?;
            if applied.is_empty() {
                print_info("No roadmap epic has recorded effort; nothing applied");
            } else {
                for (epic, rating) in &applied {
                    println!("  {} {}", epic, rating.stars());
                }
                print_success(&format!("Applied {} effort rating(s)", applied.len()));
            }
            Ok(())
        }
    }
}
