//! Typed change notifications for desk observers
//!
//! Every workflow publishes a `StateChange` after its mutation commits;
//! observers (the console printer, future panels) subscribe and render.
//! Uses a broadcast channel so any number of observers can listen without
//! the workflows knowing about them.

use crate::domain::maintenance::TaskStatus;
use crate::domain::transfer::TransferStatus;
use crate::domain::types::{RoomId, RoomStatus};
use tokio::sync::broadcast;

/// A committed mutation, described after the fact
#[derive(Debug, Clone)]
pub enum StateChange {
    /// A room moved between statuses
    RoomStatus { room: RoomId, from: RoomStatus, to: RoomStatus, event: &'static str },
    /// A check-in was committed
    CheckInCommitted { check_in: String, room: RoomId, guest: Option<String>, plate: String },
    /// A transfer was filed or reached a terminal status
    TransferUpdated {
        transfer: String,
        source: RoomId,
        destination: RoomId,
        status: TransferStatus,
    },
    /// A maintenance task was filed or changed
    TaskUpdated { task: String, room: RoomId, status: TaskStatus },
    /// The reservation cache was replaced with a fresh snapshot
    LedgerRefreshed { reservations: usize },
}

/// Broadcast hub for state changes
///
/// Clone freely; all clones publish into the same channel. Publishing with
/// no subscribers drops the change, lagging subscribers skip ahead.
#[derive(Clone)]
pub struct EventHub {
    tx: broadcast::Sender<StateChange>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.tx.subscribe()
    }

    pub fn publish(&self, change: StateChange) {
        let _ = self.tx.send(change);
    }

    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RoomStatus;

    #[test]
    fn test_publish_without_observers_is_silent() {
        let hub = EventHub::new(8);
        assert_eq!(hub.observer_count(), 0);
        hub.publish(StateChange::LedgerRefreshed { reservations: 3 });
    }

    #[test]
    fn test_observer_receives_change() {
        let hub = EventHub::new(8);
        let mut rx = hub.subscribe();

        hub.publish(StateChange::RoomStatus {
            room: RoomId::from("101"),
            from: RoomStatus::Vacant,
            to: RoomStatus::Occupied,
            event: "check_in_committed",
        });

        match rx.try_recv().unwrap() {
            StateChange::RoomStatus { room, from, to, .. } => {
                assert_eq!(room, RoomId::from("101"));
                assert_eq!(from, RoomStatus::Vacant);
                assert_eq!(to, RoomStatus::Occupied);
            }
            other => panic!("unexpected change: {other:?}"),
        }
    }

    #[test]
    fn test_all_observers_see_each_change() {
        let hub = EventHub::new(8);
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        hub.publish(StateChange::LedgerRefreshed { reservations: 12 });

        assert!(matches!(a.try_recv().unwrap(), StateChange::LedgerRefreshed { reservations: 12 }));
        assert!(matches!(b.try_recv().unwrap(), StateChange::LedgerRefreshed { reservations: 12 }));
    }
}
