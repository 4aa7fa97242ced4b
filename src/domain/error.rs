//! Typed failures for front-desk operations
//!
//! Every fallible operation in the core returns one of these; nothing here
//! is fatal to the process. `ErrorKind` groups variants into the three
//! recovery classes callers act on.

use crate::domain::types::{RoomEvent, RoomId, RoomStatus};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeskError>;

/// Recovery class of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, rejected before any state was touched
    Validation,
    /// The entity is in a lifecycle state incompatible with the operation;
    /// re-read current state and retry with a valid one
    StateConflict,
    /// An external collaborator failed; in-progress state is preserved
    External,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeskError {
    #[error("check-in needs a selected room and a license plate")]
    IncompleteCheckIn,

    #[error("transfer source and destination are the same room")]
    SameRoom,

    #[error("transfer reason must not be empty")]
    MissingReason,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid date range: start is after end")]
    InvalidRange,

    #[error("room {room} is {status} and cannot accept {event}")]
    InvalidTransition { room: RoomId, status: RoomStatus, event: RoomEvent },

    #[error("a capture is already outstanding for this session")]
    CaptureInProgress,

    #[error("{id} is no longer pending")]
    NotPending { id: String },

    #[error("{id} is not in progress")]
    NotInProgress { id: String },

    #[error("task {id} is already completed")]
    TaskCompleted { id: String },

    #[error("an active transfer already exists from {source} to {destination}")]
    DuplicateTransfer { source: RoomId, destination: RoomId },

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("no plate detected")]
    NoDetection,

    #[error("capture failed: {0}")]
    CaptureFailed(String),

    #[error("reservation source unavailable: {0}")]
    ReservationFetch(String),
}

impl DeskError {
    /// Map a variant to its recovery class
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeskError::IncompleteCheckIn
            | DeskError::SameRoom
            | DeskError::MissingReason
            | DeskError::MissingField(_)
            | DeskError::InvalidRange => ErrorKind::Validation,
            DeskError::InvalidTransition { .. }
            | DeskError::CaptureInProgress
            | DeskError::NotPending { .. }
            | DeskError::NotInProgress { .. }
            | DeskError::TaskCompleted { .. }
            | DeskError::DuplicateTransfer { .. }
            | DeskError::NotFound { .. } => ErrorKind::StateConflict,
            DeskError::NoDetection
            | DeskError::CaptureFailed(_)
            | DeskError::ReservationFetch(_) => ErrorKind::External,
        }
    }

    /// Shorthand for the common lookup failure
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        DeskError::NotFound { resource, id: id.into() }
    }
}
