//! REST backend access for RAMP.
//!
//! [`RestClient`] speaks the backend's JSON API directly; the
//! [`RestBacklogStore`], [`RestRoadmapStore`] and [`RestCapacityStore`]
//! wrappers adapt it to the `ramp-core` store traits so a
//! `RoadmapPlanner` can run against a live backend the same way it runs
//! against the in-memory stores.

#![deny(unsafe_code)]

pub mod client;
pub mod stores;

pub use client::RestClient;
pub use stores::{RestBacklogStore, RestCapacityStore, RestRoadmapStore};
