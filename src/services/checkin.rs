//! Check-In Coordinator - guest arrival from open form to committed record
//!
//! Each clerk works a session that walks `empty -> room_selected ->
//! (capture_requested -> capture_resolved)? -> commit`. The license plate
//! can come from the lane recognizer or be typed in; the most recent input
//! always wins. Commit is the only step that touches room state, and a
//! double-submitted commit returns the already-committed record.
//!
//! Capture is the one operation here that suspends. The session lock is
//! released for the duration of the recognizer call and the outcome is
//! applied only if nothing superseded the request in the meantime.

use crate::domain::checkin::{build_check_in, CheckIn, CheckInSession, SessionPhase, SessionView};
use crate::domain::error::{DeskError, Result};
use crate::domain::types::{
    GuestProfile, ReservationStatus, RoomEvent, RoomId, RoomStatus, SessionId,
};
use crate::infra::audit::{AuditLog, AuditModule};
use crate::infra::config::Config;
use crate::infra::events::{EventHub, StateChange};
use crate::io::capture::PlateRecognizer;
use crate::services::ledger::ReservationLedger;
use crate::services::registry::RoomRegistry;
use chrono::{Duration, Utc};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub struct CheckInCoordinator {
    registry: Arc<RoomRegistry>,
    ledger: Arc<ReservationLedger>,
    recognizer: Arc<dyn PlateRecognizer>,
    sessions: Mutex<FxHashMap<SessionId, CheckInSession>>,
    history: RwLock<Vec<CheckIn>>,
    next_session: AtomicU64,
    walk_in_rate: f64,
    walk_in_nights: u32,
    audit: Arc<AuditLog>,
    events: EventHub,
}

impl CheckInCoordinator {
    pub fn new(
        registry: Arc<RoomRegistry>,
        ledger: Arc<ReservationLedger>,
        recognizer: Arc<dyn PlateRecognizer>,
        config: &Config,
        audit: Arc<AuditLog>,
        events: EventHub,
    ) -> Self {
        Self {
            registry,
            ledger,
            recognizer,
            sessions: Mutex::new(FxHashMap::default()),
            history: RwLock::new(Vec::new()),
            next_session: AtomicU64::new(0),
            walk_in_rate: config.walk_in_rate(),
            walk_in_nights: config.walk_in_nights(),
            audit,
            events,
        }
    }

    /// Open a fresh session for a clerk
    pub fn open_session(&self, staff: &str) -> SessionView {
        let id = SessionId(self.next_session.fetch_add(1, Ordering::SeqCst) + 1);
        let session = CheckInSession::new(id, staff);
        let view = SessionView::of(&session);
        self.sessions.lock().insert(id, session);

        info!(session = %id, staff = %staff, "session_opened");
        view
    }

    pub fn session(&self, id: SessionId) -> Result<SessionView> {
        let sessions = self.sessions.lock();
        let session = sessions
            .get(&id)
            .ok_or_else(|| DeskError::not_found("session", id.to_string()))?;
        Ok(SessionView::of(session))
    }

    /// Pick the room for this arrival
    ///
    /// Rooms already occupied or under maintenance are refused up front.
    /// A confirmed reservation for the room is attached as a hint and its
    /// guest name prefilled unless the clerk already entered one. Changing
    /// rooms mid-flow keeps any plate or capture state.
    pub fn select_room(&self, id: SessionId, number: &RoomId) -> Result<SessionView> {
        let room = self.registry.get(number)?;
        if matches!(room.status, RoomStatus::Occupied | RoomStatus::Maintenance) {
            return Err(DeskError::InvalidTransition {
                room: number.clone(),
                status: room.status,
                event: RoomEvent::CheckInCommitted,
            });
        }

        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| DeskError::not_found("session", id.to_string()))?;

        session.room = Some(number.clone());
        session.reservation = self.ledger.confirmed_for_room(number);
        if session.guest.is_none() {
            if let Some(name) = session.reservation.as_ref().and_then(|r| r.guest_name.clone()) {
                session.guest = Some(GuestProfile::named(&name));
            }
        }
        if session.phase == SessionPhase::Empty {
            session.phase = SessionPhase::RoomSelected;
        }

        info!(
            session = %id,
            room = %number,
            reservation = session.reservation.as_ref().map(|r| r.id.as_str()).unwrap_or("-"),
            "room_selected"
        );
        Ok(SessionView::of(session))
    }

    pub fn set_guest(&self, id: SessionId, guest: GuestProfile) -> Result<SessionView> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| DeskError::not_found("session", id.to_string()))?;
        session.guest = Some(guest);
        Ok(SessionView::of(session))
    }

    /// Type the plate in by hand
    ///
    /// Manual entry always wins: any attached capture is dropped along with
    /// its confidence, and a capture still in flight will be discarded when
    /// it resolves.
    pub fn enter_plate(&self, id: SessionId, text: &str) -> Result<SessionView> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DeskError::MissingField("plate"));
        }

        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| DeskError::not_found("session", id.to_string()))?;

        session.plate = Some(trimmed.to_string());
        session.capture = None;
        session.capture_seq += 1;
        session.phase = if session.room.is_some() {
            SessionPhase::RoomSelected
        } else {
            SessionPhase::Empty
        };

        info!(session = %id, plate = %trimmed, "plate_entered");
        Ok(SessionView::of(session))
    }

    /// Ask the lane recognizer for the plate
    ///
    /// One capture may be outstanding per session. The lock is not held
    /// while the recognizer runs; whatever the session looks like when the
    /// result arrives decides whether it still applies. On failure the
    /// session returns to the phase it was in before the request.
    pub async fn request_capture(&self, id: SessionId) -> Result<SessionView> {
        let (seq, prior_phase) = {
            let mut sessions = self.sessions.lock();
            let session = sessions
                .get_mut(&id)
                .ok_or_else(|| DeskError::not_found("session", id.to_string()))?;
            if session.phase == SessionPhase::CaptureRequested {
                return Err(DeskError::CaptureInProgress);
            }
            if session.room.is_none() {
                return Err(DeskError::MissingField("room"));
            }
            let prior_phase = session.phase;
            session.phase = SessionPhase::CaptureRequested;
            session.capture_seq += 1;
            (session.capture_seq, prior_phase)
        };

        let outcome = self.recognizer.capture().await;

        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| DeskError::not_found("session", id.to_string()))?;

        if session.capture_seq != seq {
            // something newer took over while we were waiting
            info!(session = %id, seq, "capture_superseded");
            return Ok(SessionView::of(session));
        }

        match outcome {
            Ok(capture) => {
                info!(
                    session = %id,
                    plate = %capture.plate,
                    confidence = capture.confidence,
                    "capture_resolved"
                );
                session.plate = Some(capture.plate.clone());
                session.capture = Some(capture);
                session.phase = SessionPhase::CaptureResolved;
                Ok(SessionView::of(session))
            }
            Err(err) => {
                warn!(session = %id, error = %err, "capture_failed");
                session.phase = prior_phase;
                Err(err)
            }
        }
    }

    /// Commit the arrival
    ///
    /// Needs a selected room and a non-blank plate. The attached
    /// reservation is re-checked against the ledger first; if it was
    /// cancelled in the meantime the commit proceeds as a walk-in. The
    /// room transition lands before anything else changes, so a refused
    /// transition leaves the whole session as it was. Re-submitting after
    /// success returns the committed record again.
    pub fn commit(&self, id: SessionId) -> Result<CheckIn> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| DeskError::not_found("session", id.to_string()))?;

        if session.phase == SessionPhase::Empty {
            if let Some(last) = &session.last_commit {
                let history = self.history.read();
                let existing = history
                    .iter()
                    .find(|c| &c.id == last)
                    .cloned()
                    .expect("committed check-ins are never dropped");
                info!(session = %id, check_in = %existing.id, "commit_repeated");
                return Ok(existing);
            }
            return Err(DeskError::IncompleteCheckIn);
        }

        let room = session.room.clone().ok_or(DeskError::IncompleteCheckIn)?;
        let plate = session.plate_trimmed().ok_or(DeskError::IncompleteCheckIn)?.to_string();

        // the hint may be stale; the ledger has the last word
        let reservation = match &session.reservation {
            Some(held) => match self.ledger.by_id(&held.id) {
                Some(fresh) if fresh.status == ReservationStatus::Cancelled => {
                    info!(session = %id, reservation = %held.id, "reservation_cancelled_walk_in");
                    None
                }
                Some(fresh) => Some(fresh),
                None => Some(held.clone()),
            },
            None => None,
        };

        let now = Utc::now();
        let (nightly_rate, departure) = match &reservation {
            Some(r) => (r.nightly_rate(), r.departure),
            None => {
                let departure = now.date_naive() + Duration::days(self.walk_in_nights as i64);
                (self.walk_in_rate, departure)
            }
        };

        self.registry.apply_transition(&room, RoomEvent::CheckInCommitted)?;

        session.reservation = reservation;
        let check_in = build_check_in(session, &plate, nightly_rate, departure, now);
        self.history.write().push(check_in.clone());
        session.reset_after_commit(check_in.id.clone());
        let staff = session.staff.clone();
        drop(sessions);

        info!(
            check_in = %check_in.id,
            room = %room,
            plate = %plate,
            walk_in = check_in.reservation_id.is_none(),
            "check_in_committed"
        );
        let booking = match &check_in.reservation_id {
            Some(id) => format!("booking {id}"),
            None => "walk-in".to_string(),
        };
        self.audit.record(
            AuditModule::CheckIn,
            "check_in_committed",
            room.as_str(),
            Some(&staff),
            format!("plate {plate}, {booking}"),
        );
        self.events.publish(StateChange::CheckInCommitted {
            check_in: check_in.id.clone(),
            room: room.clone(),
            guest: check_in.guest.as_ref().and_then(|g| g.name.clone()),
            plate: plate.clone(),
        });
        Ok(check_in)
    }

    /// Every commit made since startup, oldest first
    pub fn committed(&self) -> Vec<CheckIn> {
        self.history.read().clone()
    }
}
