//! Room Transfer Workflow - move an in-house guest between rooms
//!
//! A transfer is filed as pending and later resolved exactly once, either
//! completed (both room statuses swap atomically through the registry) or
//! cancelled (no room effect). One pending transfer per room pair.

use crate::domain::error::{DeskError, Result};
use crate::domain::transfer::{RoomTransfer, TransferOutcome, TransferRequest, TransferStatus};
use crate::infra::audit::{AuditLog, AuditModule};
use crate::infra::events::{EventHub, StateChange};
use crate::services::registry::RoomRegistry;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

pub struct TransferWorkflow {
    registry: Arc<RoomRegistry>,
    transfers: Mutex<Vec<RoomTransfer>>,
    audit: Arc<AuditLog>,
    events: EventHub,
}

impl TransferWorkflow {
    pub fn new(registry: Arc<RoomRegistry>, audit: Arc<AuditLog>, events: EventHub) -> Self {
        Self { registry, transfers: Mutex::new(Vec::new()), audit, events }
    }

    /// File a pending transfer
    ///
    /// Rejected when source and destination are the same room, the reason
    /// is blank, either room is unknown, or the same pair already has a
    /// pending transfer. Room statuses are untouched until completion.
    pub fn request(&self, request: TransferRequest) -> Result<RoomTransfer> {
        if request.source == request.destination {
            return Err(DeskError::SameRoom);
        }
        if request.reason.trim().is_empty() {
            return Err(DeskError::MissingReason);
        }
        self.registry.get(&request.source)?;
        self.registry.get(&request.destination)?;

        let mut transfers = self.transfers.lock();
        let duplicate = transfers.iter().any(|t| {
            t.status == TransferStatus::Pending
                && t.source == request.source
                && t.destination == request.destination
        });
        if duplicate {
            return Err(DeskError::DuplicateTransfer {
                source: request.source.clone(),
                destination: request.destination.clone(),
            });
        }

        let transfer = request.into_pending(Utc::now());
        transfers.push(transfer.clone());
        drop(transfers);

        info!(
            transfer = %transfer.id,
            source = %transfer.source,
            destination = %transfer.destination,
            "transfer_requested"
        );
        self.audit.record(
            AuditModule::Transfer,
            "transfer_requested",
            &transfer.id,
            Some(&transfer.staff),
            format!("{} -> {}: {}", transfer.source, transfer.destination, transfer.reason),
        );
        self.publish(&transfer);
        Ok(transfer)
    }

    /// Resolve a pending transfer, exactly once
    ///
    /// Completion swaps both room statuses through the registry before the
    /// transfer leaves pending; a registry rejection keeps it pending.
    /// Cancellation only closes the record.
    pub fn resolve(&self, id: &str, outcome: TransferOutcome) -> Result<RoomTransfer> {
        let mut transfers = self.transfers.lock();
        let transfer = transfers
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| DeskError::not_found("transfer", id))?;
        if transfer.status != TransferStatus::Pending {
            return Err(DeskError::NotPending { id: id.to_string() });
        }

        if outcome == TransferOutcome::Completed {
            self.registry.complete_transfer(&transfer.source, &transfer.destination)?;
        }
        transfer.status = outcome.as_status();
        transfer.resolved_at = Some(Utc::now());
        let resolved = transfer.clone();
        drop(transfers);

        let action = match outcome {
            TransferOutcome::Completed => "transfer_completed",
            TransferOutcome::Cancelled => "transfer_cancelled",
        };
        info!(transfer = %resolved.id, status = %resolved.status, "transfer_resolved");
        self.audit.record(
            AuditModule::Transfer,
            action,
            &resolved.id,
            None,
            format!("{} -> {}", resolved.source, resolved.destination),
        );
        self.publish(&resolved);
        Ok(resolved)
    }

    /// Pending transfers, most recently filed first
    pub fn list_pending(&self) -> Vec<RoomTransfer> {
        self.transfers
            .lock()
            .iter()
            .filter(|t| t.status == TransferStatus::Pending)
            .rev()
            .cloned()
            .collect()
    }

    pub fn list_all(&self) -> Vec<RoomTransfer> {
        self.transfers.lock().clone()
    }

    fn publish(&self, transfer: &RoomTransfer) {
        self.events.publish(StateChange::TransferUpdated {
            transfer: transfer.id.clone(),
            source: transfer.source.clone(),
            destination: transfer.destination.clone(),
            status: transfer.status,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use crate::domain::types::{Room, RoomEvent, RoomId, RoomStatus, RoomType};

    fn registry() -> Arc<RoomRegistry> {
        let rooms = vec![
            Room::new("frontdesk", RoomId::from("101"), 1, RoomType::Standard),
            Room::new("frontdesk", RoomId::from("102"), 1, RoomType::Standard),
            Room::new("frontdesk", RoomId::from("201"), 2, RoomType::Double),
        ];
        Arc::new(RoomRegistry::new(rooms, Arc::new(AuditLog::new()), EventHub::new(8)))
    }

    fn workflow(registry: Arc<RoomRegistry>) -> TransferWorkflow {
        TransferWorkflow::new(registry, Arc::new(AuditLog::new()), EventHub::new(8))
    }

    fn occupy(registry: &RoomRegistry, number: &str) {
        registry.apply_transition(&RoomId::from(number), RoomEvent::CheckInCommitted).unwrap();
    }

    fn request(source: &str, destination: &str, staff: &str, reason: &str) -> TransferRequest {
        TransferRequest::new(RoomId::from(source), RoomId::from(destination), staff, reason)
    }

    #[test]
    fn test_request_rejects_blank_reason() {
        let workflow = workflow(registry());
        let err = workflow.request(request("101", "102", "alex", "   ")).unwrap_err();
        assert_eq!(err, DeskError::MissingReason);
        assert!(workflow.list_all().is_empty());
    }

    #[test]
    fn test_request_rejects_same_room() {
        let workflow = workflow(registry());
        let err = workflow.request(request("101", "101", "alex", "ac broken"));
        assert_eq!(err.unwrap_err(), DeskError::SameRoom);
    }

    #[test]
    fn test_request_rejects_duplicate_pending_pair() {
        let workflow = workflow(registry());
        workflow.request(request("101", "102", "alex", "ac broken")).unwrap();

        let err = workflow.request(request("101", "102", "sam", "still broken")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert!(matches!(err, DeskError::DuplicateTransfer { .. }));

        // reverse direction is a different pair
        workflow.request(request("102", "101", "sam", "swap back")).unwrap();
    }

    #[test]
    fn test_complete_swaps_room_statuses() {
        let registry = registry();
        occupy(&registry, "101");
        let workflow = workflow(registry.clone());

        let transfer = workflow.request(request("101", "102", "alex", "ac broken")).unwrap();
        let resolved = workflow.resolve(&transfer.id, TransferOutcome::Completed).unwrap();

        assert_eq!(resolved.status, TransferStatus::Completed);
        assert!(resolved.resolved_at.is_some());
        assert_eq!(registry.get(&RoomId::from("101")).unwrap().status, RoomStatus::Vacant);
        assert_eq!(registry.get(&RoomId::from("102")).unwrap().status, RoomStatus::Occupied);
    }

    #[test]
    fn test_cancel_leaves_rooms_untouched() {
        let registry = registry();
        occupy(&registry, "101");
        let workflow = workflow(registry.clone());

        let transfer = workflow.request(request("101", "102", "alex", "guest request")).unwrap();
        let resolved = workflow.resolve(&transfer.id, TransferOutcome::Cancelled).unwrap();

        assert_eq!(resolved.status, TransferStatus::Cancelled);
        assert_eq!(registry.get(&RoomId::from("101")).unwrap().status, RoomStatus::Occupied);
        assert_eq!(registry.get(&RoomId::from("102")).unwrap().status, RoomStatus::Vacant);
    }

    #[test]
    fn test_second_resolve_is_rejected() {
        let registry = registry();
        occupy(&registry, "101");
        let workflow = workflow(registry);

        let transfer = workflow.request(request("101", "102", "alex", "ac broken")).unwrap();
        workflow.resolve(&transfer.id, TransferOutcome::Completed).unwrap();

        let err = workflow.resolve(&transfer.id, TransferOutcome::Cancelled).unwrap_err();
        assert_eq!(err, DeskError::NotPending { id: transfer.id.clone() });
    }

    #[test]
    fn test_complete_with_vacant_source_stays_pending() {
        // nobody checked in to 101, so the registry refuses the swap
        let workflow = workflow(registry());
        let transfer = workflow.request(request("101", "102", "alex", "ac broken")).unwrap();

        let err = workflow.resolve(&transfer.id, TransferOutcome::Completed).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);

        let pending = workflow.list_pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, transfer.id);

        // still resolvable once the registry will accept it
        workflow.resolve(&transfer.id, TransferOutcome::Cancelled).unwrap();
    }

    #[test]
    fn test_pending_listed_most_recent_first() {
        let workflow = workflow(registry());
        let first = workflow.request(request("101", "102", "alex", "ac broken")).unwrap();
        let second = workflow.request(request("102", "201", "sam", "floor change")).unwrap();

        let pending = workflow.list_pending();
        assert_eq!(pending[0].id, second.id);
        assert_eq!(pending[1].id, first.id);
    }

    #[test]
    fn test_unknown_rooms_rejected() {
        let workflow = workflow(registry());
        let err = workflow.request(request("101", "999", "alex", "upgrade")).unwrap_err();
        assert!(matches!(err, DeskError::NotFound { resource: "room", .. }));
    }
}
