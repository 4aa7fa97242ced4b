//! IO modules - external system interfaces
//!
//! This module contains all external IO operations:
//! - `reservations` - Reservation feed clients (HTTP booking API, seeded local data)
//! - `rooms` - Room inventory source for registry seeding
//! - `capture` - License plate recognizer adapters
//! - `console` - Operator console parser and stdin reader
//! - `export` - Delimited text export boundary (spreadsheet-safe files)

pub mod capture;
pub mod console;
pub mod export;
pub mod reservations;
pub mod rooms;

// Re-export commonly used types
pub use capture::{PlateRecognizer, ScriptedRecognizer, SimulatedRecognizer};
pub use export::{to_delimited_text, write_export, Column};
pub use reservations::{HttpReservationSource, ReservationSource, SeedReservationSource};
pub use rooms::{ConfigRoomSource, RoomSource};
