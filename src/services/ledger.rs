//! Reservation Ledger - read-mostly cache of booking-system reservations
//!
//! The booking system stays the source of truth; this cache is refreshed
//! whole and read lock-free by everything else. A failed refresh keeps
//! the previous snapshot.

use crate::domain::error::Result;
use crate::domain::types::{Reservation, ReservationStatus, RoomId};
use crate::infra::audit::{AuditLog, AuditModule};
use crate::infra::events::{EventHub, StateChange};
use crate::io::reservations::ReservationSource;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

pub struct ReservationLedger {
    source: Arc<dyn ReservationSource>,
    cache: RwLock<Vec<Reservation>>,
    audit: Arc<AuditLog>,
    events: EventHub,
}

impl ReservationLedger {
    pub fn new(source: Arc<dyn ReservationSource>, audit: Arc<AuditLog>, events: EventHub) -> Self {
        Self { source, cache: RwLock::new(Vec::new()), audit, events }
    }

    /// Replace the cache with a fresh snapshot from the source
    ///
    /// The fetch runs without holding any lock; on failure the cache is
    /// left as it was and the error is returned to the caller.
    pub async fn refresh(&self) -> Result<usize> {
        let snapshot = self.source.fetch().await?;
        let count = snapshot.len();
        *self.cache.write() = snapshot;

        info!(reservations = %count, "ledger_refreshed");
        self.audit.record(
            AuditModule::Ledger,
            "ledger_refreshed",
            "-",
            None,
            format!("{count} reservations cached"),
        );
        self.events.publish(StateChange::LedgerRefreshed { reservations: count });
        Ok(count)
    }

    /// Current cached snapshot
    pub fn list(&self) -> Vec<Reservation> {
        self.cache.read().clone()
    }

    /// Confirmed reservation for a room, if the cache has one
    pub fn confirmed_for_room(&self, room: &RoomId) -> Option<Reservation> {
        self.cache
            .read()
            .iter()
            .find(|r| &r.room == room && r.status == ReservationStatus::Confirmed)
            .cloned()
    }

    pub fn by_id(&self, id: &str) -> Option<Reservation> {
        self.cache.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DeskError;
    use crate::io::reservations::{seed_reservations, SeedReservationSource};
    use async_trait::async_trait;
    use chrono::Utc;

    /// Succeeds on the first fetch, refuses afterwards
    struct FlakySource {
        calls: std::sync::atomic::AtomicU64,
    }

    #[async_trait]
    impl ReservationSource for FlakySource {
        async fn fetch(&self) -> Result<Vec<Reservation>> {
            let call = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if call == 0 {
                Ok(seed_reservations(Utc::now().date_naive()))
            } else {
                Err(DeskError::ReservationFetch("connection refused".to_string()))
            }
        }
    }

    fn ledger(source: Arc<dyn ReservationSource>) -> ReservationLedger {
        ReservationLedger::new(source, Arc::new(AuditLog::new()), EventHub::new(8))
    }

    #[tokio::test]
    async fn test_refresh_fills_cache() {
        let ledger = ledger(Arc::new(SeedReservationSource));
        assert!(ledger.is_empty());

        let count = ledger.refresh().await.unwrap();
        assert_eq!(count, 5);
        assert_eq!(ledger.len(), 5);
    }

    #[tokio::test]
    async fn test_confirmed_lookup_skips_cancelled() {
        let ledger = ledger(Arc::new(SeedReservationSource));
        ledger.refresh().await.unwrap();

        let hit = ledger.confirmed_for_room(&RoomId::from("101")).unwrap();
        assert_eq!(hit.id, "bk-5001");
        assert_eq!(hit.status, ReservationStatus::Confirmed);

        // 204's only reservation is cancelled
        assert!(ledger.confirmed_for_room(&RoomId::from("204")).is_none());
        assert!(ledger.by_id("bk-5004").is_some());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let source = Arc::new(FlakySource { calls: std::sync::atomic::AtomicU64::new(0) });
        let ledger = ledger(source);

        assert_eq!(ledger.refresh().await.unwrap(), 5);

        let err = ledger.refresh().await.unwrap_err();
        assert!(matches!(err, DeskError::ReservationFetch(_)));
        assert_eq!(ledger.len(), 5);
        assert!(ledger.by_id("bk-5001").is_some());
    }

    #[tokio::test]
    async fn test_refresh_is_audited() {
        let audit = Arc::new(AuditLog::new());
        let ledger = ReservationLedger::new(
            Arc::new(SeedReservationSource),
            audit.clone(),
            EventHub::new(8),
        );
        ledger.refresh().await.unwrap();

        let today = Utc::now().date_naive();
        let entries = audit.query(today, today, Some(AuditModule::Ledger));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "ledger_refreshed");
    }

    #[test]
    fn test_seed_data_lines_up_with_default_grid() {
        let today = Utc::now().date_naive();
        for reservation in seed_reservations(today) {
            let number: u32 = reservation.room.as_str().parse().unwrap();
            assert!((101..=310).contains(&number));
        }
    }
}
