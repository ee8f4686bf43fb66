//! Capacity plans and the effort aggregation derived from them.

use crate::ids::{EpicId, ProductId, TeamId};
use crate::quarter::{PlanningPeriod, Quarter};
use crate::rating::Rating;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unit the capacity plan records effort in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffortUnit {
    #[default]
    Sprints,
    Days,
}

impl EffortUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffortUnit::Sprints => "SPRINTS",
            EffortUnit::Days => "DAYS",
        }
    }
}

impl fmt::Display for EffortUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown effort unit '{0}', expected 'sprints' or 'days'")]
pub struct ParseEffortUnitError(String);

impl FromStr for EffortUnit {
    type Err = ParseEffortUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sprints" => Ok(EffortUnit::Sprints),
            "days" => Ok(EffortUnit::Days),
            other => Err(ParseEffortUnitError(other.to_string())),
        }
    }
}

/// A delivery team tracked in the capacity plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            product_id: None,
            is_active: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// One team's effort estimate for one epic, in the plan's unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicEffort {
    pub epic_id: EpicId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic_name: Option<String>,
    pub team_id: TeamId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    pub effort_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl EpicEffort {
    pub fn new(epic_id: impl Into<EpicId>, team_id: TeamId, effort_days: u32) -> Self {
        Self {
            epic_id: epic_id.into(),
            epic_name: None,
            team_id,
            team_name: None,
            effort_days,
            notes: None,
        }
    }
}

/// The capacity plan for one product quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub product_id: ProductId,
    pub year: i32,
    pub quarter: Quarter,
    #[serde(default)]
    pub effort_unit: EffortUnit,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub epic_efforts: Vec<EpicEffort>,
}

impl CapacityPlan {
    pub fn empty(product_id: ProductId, period: PlanningPeriod) -> Self {
        Self {
            id: None,
            product_id,
            year: period.year,
            quarter: period.quarter,
            effort_unit: EffortUnit::default(),
            teams: Vec::new(),
            epic_efforts: Vec::new(),
        }
    }

    pub fn period(&self) -> PlanningPeriod {
        PlanningPeriod::new(self.year, self.quarter)
    }

    /// Sum of every team's effort for one epic.
    pub fn total_effort_for_epic(&self, epic_id: &EpicId) -> u32 {
        self.epic_efforts
            .iter()
            .filter(|effort| &effort.epic_id == epic_id)
            .map(|effort| effort.effort_days)
            .sum()
    }

    /// Sum of one team's effort across every epic.
    pub fn total_effort_for_team(&self, team_id: TeamId) -> u32 {
        self.epic_efforts
            .iter()
            .filter(|effort| effort.team_id == team_id)
            .map(|effort| effort.effort_days)
            .sum()
    }

    /// Per-epic effort totals in first-seen order.
    pub fn aggregate_epic_efforts(&self) -> Vec<(EpicId, u32)> {
        let mut totals: Vec<(EpicId, u32)> = Vec::new();
        for effort in &self.epic_efforts {
            match totals.iter_mut().find(|(id, _)| id == &effort.epic_id) {
                Some((_, total)) => *total += effort.effort_days,
                None => totals.push((effort.epic_id.clone(), effort.effort_days)),
            }
        }
        totals
    }

    /// Star rating per epic, derived from the aggregated totals. Epics
    /// whose recorded effort sums to zero are skipped, as the auto-fill
    /// flow leaves them unrated.
    pub fn auto_effort_ratings(&self, bands: &EffortBands) -> Vec<(EpicId, Rating)> {
        self.aggregate_epic_efforts()
            .into_iter()
            .filter(|(_, total)| *total > 0)
            .map(|(id, total)| (id, bands.star_rating(total)))
            .collect()
    }
}

/// Upper bounds of the one-to-four star effort bands; anything above
/// `star4_max` is five stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffortBands {
    pub star1_max: u32,
    pub star2_max: u32,
    pub star3_max: u32,
    pub star4_max: u32,
}

impl EffortBands {
    /// Stock bands for a unit: 1/2/3/4 sprints, or 5/10/20/40 days.
    pub fn default_for(unit: EffortUnit) -> Self {
        match unit {
            EffortUnit::Sprints => Self {
                star1_max: 1,
                star2_max: 2,
                star3_max: 3,
                star4_max: 4,
            },
            EffortUnit::Days => Self {
                star1_max: 5,
                star2_max: 10,
                star3_max: 20,
                star4_max: 40,
            },
        }
    }

    /// Bands a total effort into a one-to-five star rating.
    pub fn star_rating(&self, total: u32) -> Rating {
        let stars = if total <= self.star1_max {
            1
        } else if total <= self.star2_max {
            2
        } else if total <= self.star3_max {
            3
        } else if total <= self.star4_max {
            4
        } else {
            5
        };
        Rating(stars)
    }
}
