//! Shared types for the front desk core

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a new UUIDv7 (time-sortable)
pub fn new_uuid_v7() -> String {
    Uuid::now_v7().to_string()
}

/// Newtype wrapper for room numbers to provide type safety
///
/// The printable room number (e.g. "101") is the natural key rooms are
/// addressed by throughout the workflows; the `Room` record additionally
/// carries a UUID identity for external reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// thiserror treats any field literally named `source` as the error cause and
// requires its type to implement `Error`; `DuplicateTransfer { source, .. }`
// keeps the spec'd field name, so `RoomId` must satisfy that bound.
impl std::error::Error for RoomId {}

impl From<&str> for RoomId {
    fn from(number: &str) -> Self {
        RoomId(number.to_string())
    }
}

impl From<String> for RoomId {
    fn from(number: String) -> Self {
        RoomId(number)
    }
}

/// Newtype wrapper for check-in session handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Room lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Vacant,
    Reserved,
    Occupied,
    Maintenance,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Vacant => "vacant",
            RoomStatus::Reserved => "reserved",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Room category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Standard,
    Double,
    Suite,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Standard => "standard",
            RoomType::Double => "double",
            RoomType::Suite => "suite",
        }
    }
}

/// Which side of a completed transfer a room transition applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferRole {
    Source,
    Destination,
}

/// Events accepted by the Room Registry
///
/// These are the only way a room's status changes; workflows emit them as
/// part of their commits, never speculatively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomEvent {
    CheckInCommitted,
    TransferCompleted(TransferRole),
    MaintenanceOpened,
    MaintenanceClosed,
}

impl RoomEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomEvent::CheckInCommitted => "check_in_committed",
            RoomEvent::TransferCompleted(TransferRole::Source) => "transfer_completed_source",
            RoomEvent::TransferCompleted(TransferRole::Destination) => {
                "transfer_completed_destination"
            }
            RoomEvent::MaintenanceOpened => "maintenance_opened",
            RoomEvent::MaintenanceClosed => "maintenance_closed",
        }
    }
}

impl std::fmt::Display for RoomEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A physical room, owned exclusively by the Room Registry
#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: String,
    pub hotel_id: String,
    pub number: RoomId,
    pub floor: i32,
    pub room_type: RoomType,
    pub status: RoomStatus,
}

impl Room {
    /// Create a vacant room with a fresh UUID identity
    pub fn new(hotel_id: &str, number: RoomId, floor: i32, room_type: RoomType) -> Self {
        Self {
            id: new_uuid_v7(),
            hotel_id: hotel_id.to_string(),
            number,
            floor,
            room_type,
            status: RoomStatus::Vacant,
        }
    }
}

/// Reservation status as reported by the external source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    CheckedIn,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::CheckedIn => "checked_in",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

/// A reservation cached from the external source; read-only to this core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub room: RoomId,
    #[serde(default)]
    pub guest_name: Option<String>,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub status: ReservationStatus,
    pub total_amount: f64,
}

impl Reservation {
    /// Number of nights covered, never less than one
    pub fn nights(&self) -> i64 {
        (self.departure - self.arrival).num_days().max(1)
    }

    /// Total amount spread evenly across the nights
    pub fn nightly_rate(&self) -> f64 {
        self.total_amount / self.nights() as f64
    }
}

/// Transient guest data attached to an in-progress check-in
///
/// Never persisted on its own; a committed check-in embeds a copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl GuestProfile {
    pub fn named(name: &str) -> Self {
        Self { name: Some(name.to_string()), phone: None, email: None }
    }
}

/// Result of one plate-recognition attempt
#[derive(Debug, Clone, Serialize)]
pub struct PlateCapture {
    pub id: String,
    /// Reference to the frame/image the recognizer worked from
    pub source_ref: String,
    pub plate: String,
    /// Recognition confidence, clamped to [0, 1]
    pub confidence: f64,
    pub captured_at: DateTime<Utc>,
    /// Set once a commit consumes this capture
    pub check_in: Option<String>,
}

impl PlateCapture {
    pub fn new(source_ref: &str, plate: &str, confidence: f64) -> Self {
        Self {
            id: new_uuid_v7(),
            source_ref: source_ref.to_string(),
            plate: plate.to_string(),
            confidence: confidence.clamp(0.0, 1.0),
            captured_at: Utc::now(),
            check_in: None,
        }
    }
}
