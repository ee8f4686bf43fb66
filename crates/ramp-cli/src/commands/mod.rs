//! CLI command implementations

pub mod backlog;
pub mod capacity;
pub mod roadmap;
