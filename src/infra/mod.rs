//! Infrastructure - configuration, audit trail, and change notifications
//!
//! This module contains infrastructure concerns:
//! - `config` - Application configuration (TOML loading, defaults)
//! - `audit` - Append-only audit trail shared by the workflows
//! - `events` - Broadcast hub notifying observers of committed changes

pub mod audit;
pub mod config;
pub mod events;

// Re-export commonly used types
pub use audit::{AuditEntry, AuditLog, AuditModule};
pub use config::{Config, ReservationMode};
pub use events::{EventHub, StateChange};
