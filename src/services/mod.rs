//! Services - business logic and state management
//!
//! This module contains the core business logic services:
//! - `desk` - Central command orchestrator for the front desk loop
//! - `registry` - Room state registry, sole mutation path for room status
//! - `ledger` - Read-only reservation cache refreshed from the booking feed
//! - `checkin` - Check-in session lifecycle and commit
//! - `transfers` - Room transfer requests and resolution
//! - `maintenance` - Maintenance task lifecycle and stats
//! - `reports` - Revenue, occupancy, and audit reporting

pub mod checkin;
pub mod desk;
pub mod ledger;
pub mod maintenance;
pub mod registry;
pub mod reports;
pub mod transfers;

// Re-export commonly used types
pub use checkin::CheckInCoordinator;
pub use desk::{DeskCommand, FrontDesk, ReportKind};
pub use ledger::ReservationLedger;
pub use maintenance::MaintenanceWorkflow;
pub use registry::RoomRegistry;
pub use reports::{DateRange, ReportAggregator};
pub use transfers::TransferWorkflow;
