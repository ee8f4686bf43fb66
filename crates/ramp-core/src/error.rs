//! Error taxonomy for store access and planning sessions.

use ramp_types::EpicId;
use thiserror::Error;

/// Errors surfaced by the store contracts.
///
/// None of these are fatal to a planning session. `Conflict` carries
/// the store-authored message verbatim, since the uniqueness rule it
/// reports is owned by the server and its text is shown untranslated.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from misusing a planning session: wrong edit surface for the
/// operation, or epics the session cannot act on. Store failures pass
/// through transparently.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("A batch edit is in progress; save or cancel it first")]
    EditInProgress,

    #[error("No batch edit is in progress")]
    NotEditing,

    #[error("Epic {0} is not in the backlog")]
    UnknownEpic(EpicId),

    #[error("Epic {0} is not on this quarter's roadmap")]
    NotOnRoadmap(EpicId),

    #[error("Epic {0} is already on this quarter's roadmap")]
    AlreadyOnRoadmap(EpicId),

    #[error("Epic {0} is already assigned to another quarter")]
    AssignedElsewhere(EpicId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type PlanResult<T> = Result<T, PlanError>;
