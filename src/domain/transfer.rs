//! Room transfer requests and their lifecycle

use crate::domain::types::{new_uuid_v7, RoomId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle status of a transfer request
///
/// Pending is the only non-terminal state; Completed and Cancelled are
/// terminal and never transition further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Completed,
    Cancelled,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Completed => "completed",
            TransferStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransferStatus::Pending)
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a pending transfer is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Completed,
    Cancelled,
}

impl TransferOutcome {
    pub fn as_status(&self) -> TransferStatus {
        match self {
            TransferOutcome::Completed => TransferStatus::Completed,
            TransferOutcome::Cancelled => TransferStatus::Cancelled,
        }
    }
}

/// A request to move an occupied room's guest to another room
#[derive(Debug, Clone, Serialize)]
pub struct RoomTransfer {
    pub id: String,
    pub source: RoomId,
    pub destination: RoomId,
    pub guest_name: Option<String>,
    pub reservation_id: Option<String>,
    pub reason: String,
    pub requested_at: DateTime<Utc>,
    /// Staff member who filed the request
    pub staff: String,
    pub status: TransferStatus,
    pub notes: Option<String>,
    /// Set exactly when the transfer leaves Pending
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Input for filing a transfer request
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub source: RoomId,
    pub destination: RoomId,
    pub reason: String,
    pub staff: String,
    pub guest_name: Option<String>,
    pub reservation_id: Option<String>,
    pub notes: Option<String>,
}

impl TransferRequest {
    pub fn new(source: RoomId, destination: RoomId, staff: &str, reason: &str) -> Self {
        Self {
            source,
            destination,
            reason: reason.to_string(),
            staff: staff.to_string(),
            guest_name: None,
            reservation_id: None,
            notes: None,
        }
    }

    pub fn with_guest(mut self, guest_name: &str) -> Self {
        self.guest_name = Some(guest_name.to_string());
        self
    }

    pub fn with_reservation(mut self, reservation_id: &str) -> Self {
        self.reservation_id = Some(reservation_id.to_string());
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    /// Materialize the pending transfer record
    pub(crate) fn into_pending(self, now: DateTime<Utc>) -> RoomTransfer {
        RoomTransfer {
            id: new_uuid_v7(),
            source: self.source,
            destination: self.destination,
            guest_name: self.guest_name,
            reservation_id: self.reservation_id,
            reason: self.reason.trim().to_string(),
            requested_at: now,
            staff: self.staff,
            status: TransferStatus::Pending,
            notes: self.notes,
            resolved_at: None,
        }
    }
}
