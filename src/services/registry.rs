//! Room Registry - authoritative source of room status
//!
//! Every status change flows through `apply_transition`; workflows emit
//! events as part of their commits and never write a status directly.
//! A transition is visible to all readers before the triggering commit
//! reports success.

use crate::domain::error::{DeskError, Result};
use crate::domain::types::{Room, RoomEvent, RoomId, RoomStatus, TransferRole};
use crate::infra::audit::{AuditLog, AuditModule};
use crate::infra::events::{EventHub, StateChange};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::info;

/// Legal status transitions; everything else is rejected
fn next_status(status: RoomStatus, event: RoomEvent) -> Option<RoomStatus> {
    use RoomStatus::*;
    match (status, event) {
        (Vacant | Reserved, RoomEvent::CheckInCommitted) => Some(Occupied),
        (Occupied, RoomEvent::TransferCompleted(TransferRole::Source)) => Some(Vacant),
        (Vacant | Reserved, RoomEvent::TransferCompleted(TransferRole::Destination)) => {
            Some(Occupied)
        }
        (Vacant | Reserved, RoomEvent::MaintenanceOpened) => Some(Maintenance),
        (Maintenance, RoomEvent::MaintenanceClosed) => Some(Vacant),
        _ => None,
    }
}

/// Authoritative owner of room state
pub struct RoomRegistry {
    rooms: RwLock<FxHashMap<RoomId, Room>>,
    audit: Arc<AuditLog>,
    events: EventHub,
}

impl RoomRegistry {
    pub fn new(inventory: Vec<Room>, audit: Arc<AuditLog>, events: EventHub) -> Self {
        let mut rooms = FxHashMap::default();
        for room in inventory {
            rooms.insert(room.number.clone(), room);
        }
        info!(rooms = %rooms.len(), "registry_seeded");
        Self { rooms: RwLock::new(rooms), audit, events }
    }

    /// Rooms a guest can be checked in to, sorted by floor and number
    pub fn list_available(&self) -> Vec<Room> {
        let mut rooms: Vec<Room> = self
            .rooms
            .read()
            .values()
            .filter(|r| matches!(r.status, RoomStatus::Vacant | RoomStatus::Reserved))
            .cloned()
            .collect();
        rooms.sort_by_key(|r| (r.floor, r.number.clone()));
        rooms
    }

    /// Every room, sorted by floor and number
    pub fn list_all(&self) -> Vec<Room> {
        let mut rooms: Vec<Room> = self.rooms.read().values().cloned().collect();
        rooms.sort_by_key(|r| (r.floor, r.number.clone()));
        rooms
    }

    pub fn get(&self, number: &RoomId) -> Result<Room> {
        self.rooms
            .read()
            .get(number)
            .cloned()
            .ok_or_else(|| DeskError::not_found("room", number.as_str()))
    }

    pub fn status(&self, number: &RoomId) -> Result<RoomStatus> {
        self.get(number).map(|r| r.status)
    }

    /// Total sellable rooms
    pub fn count(&self) -> usize {
        self.rooms.read().len()
    }

    /// Apply a workflow event to one room
    ///
    /// Fails with `InvalidTransition` when the room's current status cannot
    /// legally receive the event; the room is untouched in that case.
    pub fn apply_transition(&self, number: &RoomId, event: RoomEvent) -> Result<Room> {
        let mut rooms = self.rooms.write();
        let room = rooms
            .get_mut(number)
            .ok_or_else(|| DeskError::not_found("room", number.as_str()))?;

        let Some(next) = next_status(room.status, event) else {
            return Err(DeskError::InvalidTransition {
                room: number.clone(),
                status: room.status,
                event,
            });
        };

        let prev = room.status;
        room.status = next;
        let snapshot = room.clone();
        drop(rooms);

        self.record_change(&snapshot, prev, event);
        Ok(snapshot)
    }

    /// Apply both sides of a completed transfer in one step
    ///
    /// Either the source is released and the destination occupied, or
    /// neither room changes. Validation covers both rooms before either
    /// is touched.
    pub fn complete_transfer(
        &self,
        source: &RoomId,
        destination: &RoomId,
    ) -> Result<(Room, Room)> {
        let mut rooms = self.rooms.write();

        let src_status = rooms
            .get(source)
            .ok_or_else(|| DeskError::not_found("room", source.as_str()))?
            .status;
        let dst_status = rooms
            .get(destination)
            .ok_or_else(|| DeskError::not_found("room", destination.as_str()))?
            .status;

        let src_event = RoomEvent::TransferCompleted(TransferRole::Source);
        let dst_event = RoomEvent::TransferCompleted(TransferRole::Destination);

        let Some(src_next) = next_status(src_status, src_event) else {
            return Err(DeskError::InvalidTransition {
                room: source.clone(),
                status: src_status,
                event: src_event,
            });
        };
        let Some(dst_next) = next_status(dst_status, dst_event) else {
            return Err(DeskError::InvalidTransition {
                room: destination.clone(),
                status: dst_status,
                event: dst_event,
            });
        };

        let src_room = rooms.get_mut(source).expect("validated above");
        src_room.status = src_next;
        let src_snapshot = src_room.clone();
        let dst_room = rooms.get_mut(destination).expect("validated above");
        dst_room.status = dst_next;
        let dst_snapshot = dst_room.clone();
        drop(rooms);

        self.record_change(&src_snapshot, src_status, src_event);
        self.record_change(&dst_snapshot, dst_status, dst_event);
        Ok((src_snapshot, dst_snapshot))
    }

    fn record_change(&self, room: &Room, from: RoomStatus, event: RoomEvent) {
        info!(
            room = %room.number, from = %from, to = %room.status, event = %event,
            "room_transition"
        );
        self.audit.record(
            AuditModule::Registry,
            "room_status_changed",
            room.number.as_str(),
            None,
            format!("{} -> {} on {}", from, room.status, event),
        );
        self.events.publish(StateChange::RoomStatus {
            room: room.number.clone(),
            from,
            to: room.status,
            event: event.as_str(),
        });
    }
}
