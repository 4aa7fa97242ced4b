//! Domain models - core business types for front-desk operations
//!
//! This module contains the canonical data types used throughout the system:
//! - `Room` / `RoomStatus` / `RoomEvent` - rooms and their registry transitions
//! - `Reservation` - externally-owned booking data, cached read-only
//! - `CheckIn` / `CheckInSession` - committed arrivals and the in-progress form
//! - `RoomTransfer` - move requests between rooms
//! - `MaintenanceTask` - repair/inspection work against rooms
//! - `DeskError` - the typed failure taxonomy shared by every workflow

pub mod checkin;
pub mod error;
pub mod maintenance;
pub mod transfer;
pub mod types;

// Re-export commonly used types at module level
pub use error::{DeskError, ErrorKind, Result};
