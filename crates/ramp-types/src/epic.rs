//! Backlog epics and the candidate filtering applied before assignment.

use crate::ids::EpicId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A backlog epic as served by the backlog endpoint.
///
/// Theme and initiative are denormalized into the DTO (id, name and, for
/// themes, a display color), matching the backend's backlog projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Epic {
    pub id: EpicId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
}

impl Epic {
    pub fn new(id: impl Into<EpicId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            theme_id: None,
            theme_name: None,
            theme_color: None,
            initiative_id: None,
            initiative_name: None,
            track: None,
        }
    }
}

/// Filters applied to the candidate list. All set fields must match.
///
/// `search` is a case-insensitive substring match on the epic name;
/// theme, initiative and track are exact matches, as they come from
/// pick lists rather than free text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpicFilter {
    pub search: Option<String>,
    pub theme: Option<String>,
    pub initiative: Option<String>,
    pub track: Option<String>,
}

impl EpicFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, needle: impl Into<String>) -> Self {
        self.search = Some(needle.into());
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn with_initiative(mut self, initiative: impl Into<String>) -> Self {
        self.initiative = Some(initiative.into());
        self
    }

    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = Some(track.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.theme.is_none()
            && self.initiative.is_none()
            && self.track.is_none()
    }

    pub fn matches(&self, epic: &Epic) -> bool {
        if let Some(needle) = &self.search {
            if !epic.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(theme) = &self.theme {
            if epic.theme_name.as_deref() != Some(theme.as_str()) {
                return false;
            }
        }
        if let Some(initiative) = &self.initiative {
            if epic.initiative_name.as_deref() != Some(initiative.as_str()) {
                return false;
            }
        }
        if let Some(track) = &self.track {
            if epic.track.as_deref() != Some(track.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Epics still available for assignment: everything in `epics` that is
/// not already assigned elsewhere and passes the filter. Backlog order
/// is preserved.
pub fn available_epics(
    epics: &[Epic],
    assigned: &HashSet<EpicId>,
    filter: &EpicFilter,
) -> Vec<Epic> {
    epics
        .iter()
        .filter(|epic| !assigned.contains(&epic.id))
        .filter(|epic| filter.matches(epic))
        .cloned()
        .collect()
}

/// Distinct theme names in first-seen order, for populating pick lists.
pub fn distinct_themes(epics: &[Epic]) -> Vec<String> {
    distinct(epics.iter().filter_map(|e| e.theme_name.as_deref()))
}

/// Distinct initiative names in first-seen order.
pub fn distinct_initiatives(epics: &[Epic]) -> Vec<String> {
    distinct(epics.iter().filter_map(|e| e.initiative_name.as_deref()))
}

/// Distinct track values in first-seen order.
pub fn distinct_tracks(epics: &[Epic]) -> Vec<String> {
    distinct(epics.iter().filter_map(|e| e.track.as_deref()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        if !value.is_empty() && seen.insert(value) {
            out.push(value.to_string());
        }
    }
    out
}
