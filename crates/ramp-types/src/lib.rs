//! RAMP Types - Wire data model for quarterly roadmap planning
//!
//! RAMP (Roadmap and Allocation Management Planner) plans one product
//! quarter at a time: backlog epics are assigned to the quarter, scored
//! with the RICE heuristic, and costed against the quarter's capacity
//! plan. This crate holds the wire DTOs shared by every other RAMP crate
//! plus the pure derivations over them:
//!
//! - **RICE score**: reach x impact x confidence, recomputed from its
//!   factors on every change and never trusted from a stored echo
//! - **Quarter bounds**: the calendar window implied by a (year, quarter)
//!   pair
//! - **Candidate filtering**: backlog epics minus those committed to
//!   other quarters, intersected with the active filters
//! - **Effort aggregation**: per-epic capacity totals across teams,
//!   banded into star ratings
//!
//! No I/O happens here; stores and planning sessions live in `ramp-core`
//! and `ramp-client`.

#![deny(unsafe_code)]

pub mod capacity;
pub mod document;
pub mod epic;
pub mod ids;
pub mod item;
pub mod quarter;
pub mod rating;

// Re-export main types
pub use capacity::{
    CapacityPlan, EffortBands, EffortUnit, EpicEffort, ParseEffortUnitError, Team,
};
pub use document::RoadmapDocument;
pub use epic::{
    available_epics, distinct_initiatives, distinct_themes, distinct_tracks, Epic, EpicFilter,
};
pub use ids::{EpicId, ProductId, TeamId};
pub use item::{
    rice_score, ParsePriorityError, ParseStatusError, Priority, RoadmapItem, RoadmapStatus,
};
pub use quarter::{PlanningPeriod, Quarter, QuarterOutOfRange};
pub use rating::{Rating, RatingOutOfRange};
