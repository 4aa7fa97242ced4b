//! Append-only audit trail of workflow mutations
//!
//! Entries are written synchronously inside each workflow's commit path, so
//! the trail never misses a mutation that succeeded. The log is in-memory
//! and lives as long as the process.

use crate::domain::types::new_uuid_v7;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// Workflow that produced an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditModule {
    Registry,
    CheckIn,
    Transfer,
    Maintenance,
    Ledger,
}

impl AuditModule {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditModule::Registry => "registry",
            AuditModule::CheckIn => "check_in",
            AuditModule::Transfer => "transfer",
            AuditModule::Maintenance => "maintenance",
            AuditModule::Ledger => "ledger",
        }
    }
}

impl std::str::FromStr for AuditModule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registry" => Ok(AuditModule::Registry),
            "check_in" | "checkin" => Ok(AuditModule::CheckIn),
            "transfer" => Ok(AuditModule::Transfer),
            "maintenance" | "maint" => Ok(AuditModule::Maintenance),
            "ledger" => Ok(AuditModule::Ledger),
            other => Err(format!("unknown audit module: {other}")),
        }
    }
}

/// One immutable audit record
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: String,
    pub at: DateTime<Utc>,
    pub module: AuditModule,
    /// Action name, e.g. "check_in_committed"
    pub action: String,
    /// Room number or entity id the action applies to
    pub subject: String,
    /// Staff member who drove the action, when attributable
    pub staff: Option<String>,
    pub detail: String,
}

/// In-memory audit log shared by all workflows
pub struct AuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self { entries: RwLock::new(Vec::new()) }
    }

    /// Append an entry stamped with the current time
    pub fn record(
        &self,
        module: AuditModule,
        action: &str,
        subject: &str,
        staff: Option<&str>,
        detail: impl Into<String>,
    ) {
        let entry = AuditEntry {
            id: new_uuid_v7(),
            at: Utc::now(),
            module,
            action: action.to_string(),
            subject: subject.to_string(),
            staff: staff.map(str::to_string),
            detail: detail.into(),
        };
        self.entries.write().push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Most recent entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read();
        entries.iter().rev().take(limit).cloned().collect()
    }

    /// Entries whose timestamp falls on a day in `[start, end]`, optionally
    /// restricted to one module, newest first
    pub fn query(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        module: Option<AuditModule>,
    ) -> Vec<AuditEntry> {
        let entries = self.entries.read();
        entries
            .iter()
            .rev()
            .filter(|e| {
                let day = e.at.date_naive();
                day >= start && day <= end && module.map_or(true, |m| e.module == m)
            })
            .cloned()
            .collect()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}
