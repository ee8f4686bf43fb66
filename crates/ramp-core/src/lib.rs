//! RAMP Core - Planning sessions over pluggable stores
//!
//! The operational half of RAMP: contracts for the three external
//! collaborators (backlog, roadmap persistence, capacity planning),
//! in-memory implementations for development and testing, and the
//! [`RoadmapPlanner`] session that drives a quarter's roadmap through
//! the Viewing ⇄ Editing state machine with optimistic autosaves and
//! conflict reconciliation.
//!
//! The REST implementations of the store contracts live in
//! `ramp-client`; this crate never performs HTTP itself.

#![deny(unsafe_code)]

pub mod error;
pub mod memory;
pub mod planner;
pub mod store;

// Re-export main types
pub use error::{PlanError, PlanResult, StoreError, StoreResult};
pub use memory::{InMemoryBacklog, InMemoryCapacity, InMemoryRoadmaps};
pub use planner::{EditMode, FieldEdit, Notice, RoadmapPlanner, SaveOutcome};
pub use store::{BacklogStore, CapacityStore, RoadmapStore};
