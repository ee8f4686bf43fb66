//! Roadmap items and RICE score derivation.

use crate::epic::Epic;
use crate::ids::EpicId;
use crate::quarter::PlanningPeriod;
use crate::rating::Rating;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The RICE product of the three scoring factors.
///
/// Each factor lives on the zero-to-five scale, so the product is in
/// `0..=125` and any unrated factor zeroes the whole score.
pub fn rice_score(reach: Rating, impact: Rating, confidence: Rating) -> u32 {
    reach.value() as u32 * impact.value() as u32 * confidence.value() as u32
}

/// Delivery status of a roadmap item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoadmapStatus {
    #[default]
    Proposed,
    Committed,
    #[serde(rename = "To-Do")]
    ToDo,
    #[serde(rename = "In-Progress")]
    InProgress,
    Done,
}

impl RoadmapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoadmapStatus::Proposed => "Proposed",
            RoadmapStatus::Committed => "Committed",
            RoadmapStatus::ToDo => "To-Do",
            RoadmapStatus::InProgress => "In-Progress",
            RoadmapStatus::Done => "Done",
        }
    }
}

impl fmt::Display for RoadmapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status '{0}', expected one of: proposed, committed, to-do, in-progress, done")]
pub struct ParseStatusError(String);

impl FromStr for RoadmapStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "proposed" => Ok(RoadmapStatus::Proposed),
            "committed" => Ok(RoadmapStatus::Committed),
            "to-do" | "todo" => Ok(RoadmapStatus::ToDo),
            "in-progress" | "inprogress" => Ok(RoadmapStatus::InProgress),
            "done" => Ok(RoadmapStatus::Done),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Scheduling priority of a roadmap item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown priority '{0}', expected one of: low, medium, high, critical")]
pub struct ParsePriorityError(String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            other => Err(ParsePriorityError(other.to_string())),
        }
    }
}

/// One epic's entry in a quarterly roadmap document.
///
/// The scoring factors and the derived RICE score are private: every
/// mutation goes through a setter that recomputes the score, so the
/// stored score can never drift from its factors. Documents adopted
/// from the wire are re-normalized with [`RoadmapItem::recompute_rice`]
/// because serde fills the fields directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapItem {
    pub epic_id: EpicId,
    pub epic_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic_description: Option<String>,
    reach: Rating,
    impact: Rating,
    confidence: Rating,
    rice_score: u32,
    #[serde(default)]
    pub status: RoadmapStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub effort_rating: Rating,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl RoadmapItem {
    /// A fresh unrated entry spanning the whole planning period.
    pub fn new(epic: &Epic, period: PlanningPeriod) -> Self {
        Self {
            epic_id: epic.id.clone(),
            epic_name: epic.name.clone(),
            epic_description: epic.description.clone(),
            reach: Rating::ZERO,
            impact: Rating::ZERO,
            confidence: Rating::ZERO,
            rice_score: 0,
            status: RoadmapStatus::default(),
            priority: Priority::default(),
            effort_rating: Rating::ZERO,
            start_date: Some(period.start_date()),
            end_date: Some(period.end_date()),
        }
    }

    /// An entry for `epic`, carrying forward ratings, status and dates
    /// from a prior entry when one exists. The RICE score is always
    /// recomputed from the carried factors rather than copied.
    pub fn for_epic(epic: &Epic, period: PlanningPeriod, prior: Option<&RoadmapItem>) -> Self {
        match prior {
            Some(prev) => {
                let mut item = prev.clone();
                item.epic_id = epic.id.clone();
                item.epic_name = epic.name.clone();
                item.epic_description = epic.description.clone();
                if item.start_date.is_none() {
                    item.start_date = Some(period.start_date());
                }
                if item.end_date.is_none() {
                    item.end_date = Some(period.end_date());
                }
                item.recompute_rice();
                item
            }
            None => Self::new(epic, period),
        }
    }

    pub fn reach(&self) -> Rating {
        self.reach
    }

    pub fn impact(&self) -> Rating {
        self.impact
    }

    pub fn confidence(&self) -> Rating {
        self.confidence
    }

    pub fn rice_score(&self) -> u32 {
        self.rice_score
    }

    pub fn set_reach(&mut self, reach: Rating) {
        self.reach = reach;
        self.recompute_rice();
    }

    pub fn set_impact(&mut self, impact: Rating) {
        self.impact = impact;
        self.recompute_rice();
    }

    pub fn set_confidence(&mut self, confidence: Rating) {
        self.confidence = confidence;
        self.recompute_rice();
    }

    /// Re-derives the stored score from the factors. Returns true when
    /// the stored value was stale.
    pub fn recompute_rice(&mut self) -> bool {
        let fresh = rice_score(self.reach, self.impact, self.confidence);
        let stale = self.rice_score != fresh;
        self.rice_score = fresh;
        stale
    }

    /// Start date, falling back to the period start when unset.
    pub fn effective_start(&self, period: PlanningPeriod) -> NaiveDate {
        self.start_date.unwrap_or_else(|| period.start_date())
    }

    /// End date, falling back to the period end when unset.
    pub fn effective_end(&self, period: PlanningPeriod) -> NaiveDate {
        self.end_date.unwrap_or_else(|| period.end_date())
    }
}
