//! Check-in records and the per-session state machine

use crate::domain::types::{
    new_uuid_v7, GuestProfile, PlateCapture, Reservation, RoomId, SessionId,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Phase of an in-progress check-in session
///
/// `Empty → RoomSelected → (CaptureRequested → CaptureResolved)? → commit`.
/// A successful commit resets the session to `Empty`; the session remembers
/// the committed id so a double-submitted commit is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Empty,
    RoomSelected,
    CaptureRequested,
    CaptureResolved,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Empty => "empty",
            SessionPhase::RoomSelected => "room_selected",
            SessionPhase::CaptureRequested => "capture_requested",
            SessionPhase::CaptureResolved => "capture_resolved",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed check-in; immutable once created
#[derive(Debug, Clone, Serialize)]
pub struct CheckIn {
    pub id: String,
    pub reservation_id: Option<String>,
    pub guest: Option<GuestProfile>,
    pub room: RoomId,
    pub checked_in_at: DateTime<Utc>,
    /// Staff member who registered the arrival
    pub staff: String,
    pub license_plate: String,
    /// The capture this commit consumed, if the plate came from one
    pub capture: Option<PlateCapture>,
    /// Rate accrued per occupied night, for reporting
    pub nightly_rate: f64,
    /// First morning the room is free again
    pub departure: NaiveDate,
}

/// Mutable state of one front-desk check-in form
#[derive(Debug, Clone)]
pub struct CheckInSession {
    pub id: SessionId,
    pub staff: String,
    pub phase: SessionPhase,
    pub room: Option<RoomId>,
    /// Auto-attached confirmed reservation (hint, not a lock)
    pub reservation: Option<Reservation>,
    pub guest: Option<GuestProfile>,
    pub plate: Option<String>,
    pub capture: Option<PlateCapture>,
    /// Bumped whenever a new capture is requested or the plate is entered
    /// manually; a resolving capture carrying a stale seq is discarded
    pub capture_seq: u64,
    /// Id of the last commit made from this session (idempotency guard)
    pub last_commit: Option<String>,
    pub opened_at: DateTime<Utc>,
}

impl CheckInSession {
    pub fn new(id: SessionId, staff: &str) -> Self {
        Self {
            id,
            staff: staff.to_string(),
            phase: SessionPhase::Empty,
            room: None,
            reservation: None,
            guest: None,
            plate: None,
            capture: None,
            capture_seq: 0,
            last_commit: None,
            opened_at: Utc::now(),
        }
    }

    /// Clear the form after a successful commit, remembering its id
    pub fn reset_after_commit(&mut self, check_in_id: String) {
        self.phase = SessionPhase::Empty;
        self.room = None;
        self.reservation = None;
        self.guest = None;
        self.plate = None;
        self.capture = None;
        self.capture_seq += 1;
        self.last_commit = Some(check_in_id);
    }

    /// Plate text with surrounding whitespace stripped, if any is set
    pub fn plate_trimmed(&self) -> Option<&str> {
        self.plate.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }
}

/// Read-only snapshot of a session for the presentation boundary
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session: SessionId,
    pub staff: String,
    pub phase: SessionPhase,
    pub room: Option<RoomId>,
    pub reservation_id: Option<String>,
    pub guest_name: Option<String>,
    pub plate: Option<String>,
    /// Confidence of the attached capture; absent after manual entry
    pub confidence: Option<f64>,
    pub last_commit: Option<String>,
}

impl SessionView {
    pub fn of(session: &CheckInSession) -> Self {
        Self {
            session: session.id,
            staff: session.staff.clone(),
            phase: session.phase,
            room: session.room.clone(),
            reservation_id: session.reservation.as_ref().map(|r| r.id.clone()),
            guest_name: session.guest.as_ref().and_then(|g| g.name.clone()),
            plate: session.plate.clone(),
            confidence: session.capture.as_ref().map(|c| c.confidence),
            last_commit: session.last_commit.clone(),
        }
    }
}

/// Build the committed record out of a session that passed validation
pub(crate) fn build_check_in(
    session: &CheckInSession,
    plate: &str,
    nightly_rate: f64,
    departure: NaiveDate,
    now: DateTime<Utc>,
) -> CheckIn {
    let id = new_uuid_v7();
    let capture = session.capture.clone().map(|mut capture| {
        capture.check_in = Some(id.clone());
        capture
    });
    CheckIn {
        id,
        reservation_id: session.reservation.as_ref().map(|r| r.id.clone()),
        guest: session.guest.clone(),
        room: session.room.clone().expect("validated before build"),
        checked_in_at: now,
        staff: session.staff.clone(),
        license_plate: plate.to_string(),
        capture,
        nightly_rate,
        departure,
    }
}
