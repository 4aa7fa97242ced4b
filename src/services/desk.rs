//! Front desk command loop
//!
//! The FrontDesk owns every workflow and consumes `DeskCommand`s from one
//! mpsc channel, so mutations apply strictly in arrival order. Captures
//! and ledger refreshes are spawned off the loop; everything else runs
//! inline. Outcomes for the operator go to stdout, diagnostics to the log.

use crate::domain::checkin::SessionView;
use crate::domain::error::Result;
use crate::domain::maintenance::{MaintenanceStats, NewTask, TaskFilter};
use crate::domain::transfer::{TransferOutcome, TransferRequest};
use crate::domain::types::{GuestProfile, RoomId, SessionId};
use crate::infra::audit::AuditModule;
use crate::infra::config::Config;
use crate::io::export::{to_delimited_text, write_export};
use crate::services::checkin::CheckInCoordinator;
use crate::services::ledger::ReservationLedger;
use crate::services::maintenance::MaintenanceWorkflow;
use crate::services::registry::RoomRegistry;
use crate::services::reports::{
    audit_columns, occupancy_columns, revenue_columns, DateRange, ReportAggregator,
};
use crate::services::transfers::TransferWorkflow;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Duration, Instant};
use tracing::{error, info, warn};

/// One operator action, parsed off the console
#[derive(Debug, Clone)]
pub enum DeskCommand {
    OpenSession { staff: String },
    SelectRoom { session: SessionId, room: RoomId },
    EnterPlate { session: SessionId, plate: String },
    SetGuest { session: SessionId, name: String },
    RequestCapture { session: SessionId },
    Commit { session: SessionId },
    RequestTransfer(TransferRequest),
    ResolveTransfer { id: String, outcome: TransferOutcome },
    PendingTransfers,
    CreateTask(NewTask),
    StartTask { id: String },
    CompleteTask { id: String, actual_cost: Option<f64> },
    AssignTask { id: String, assignee: String },
    ListTasks,
    TaskStats,
    Rooms,
    Refresh,
    Report { kind: ReportKind, range: DateRange, module: Option<AuditModule> },
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Revenue,
    Occupancy,
    Audit,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Revenue => "revenue",
            ReportKind::Occupancy => "occupancy",
            ReportKind::Audit => "audit",
        }
    }
}

/// Command processor wiring all workflows together
pub struct FrontDesk {
    /// Authoritative room state
    registry: Arc<RoomRegistry>,
    /// Cached reservations from the booking system
    ledger: Arc<ReservationLedger>,
    /// Check-in sessions and committed history
    checkins: Arc<CheckInCoordinator>,
    /// Pending and resolved room transfers
    transfers: Arc<TransferWorkflow>,
    /// Maintenance task lifecycle
    maintenance: Arc<MaintenanceWorkflow>,
    /// Read-only series over committed facts
    reports: Arc<ReportAggregator>,
    /// Directory report files land in
    export_dir: String,
    /// Seconds between background ledger refreshes; 0 disables them
    refresh_interval_secs: u64,
}

impl FrontDesk {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<RoomRegistry>,
        ledger: Arc<ReservationLedger>,
        checkins: Arc<CheckInCoordinator>,
        transfers: Arc<TransferWorkflow>,
        maintenance: Arc<MaintenanceWorkflow>,
        reports: Arc<ReportAggregator>,
        config: &Config,
    ) -> Self {
        Self {
            registry,
            ledger,
            checkins,
            transfers,
            maintenance,
            reports,
            export_dir: config.export_dir().to_string(),
            refresh_interval_secs: config.refresh_interval_secs(),
        }
    }

    /// Consume commands until `Shutdown` or the channel closes
    pub async fn run(&self, mut command_rx: mpsc::Receiver<DeskCommand>) {
        let period = Duration::from_secs(self.refresh_interval_secs.max(1));
        let mut refresh_timer = interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                command = command_rx.recv() => {
                    match command {
                        Some(DeskCommand::Shutdown) | None => {
                            info!("front_desk_stopping");
                            break;
                        }
                        Some(command) => self.handle(command),
                    }
                }
                _ = refresh_timer.tick(), if self.refresh_interval_secs > 0 => {
                    self.spawn_refresh();
                }
            }
        }
    }

    fn handle(&self, command: DeskCommand) {
        match command {
            DeskCommand::OpenSession { staff } => {
                let view = self.checkins.open_session(&staff);
                println!("session {} opened for {}", view.session, view.staff);
            }
            DeskCommand::SelectRoom { session, room } => {
                self.print_session(self.checkins.select_room(session, &room));
            }
            DeskCommand::EnterPlate { session, plate } => {
                self.print_session(self.checkins.enter_plate(session, &plate));
            }
            DeskCommand::SetGuest { session, name } => {
                let guest = GuestProfile::named(&name);
                self.print_session(self.checkins.set_guest(session, guest));
            }
            DeskCommand::RequestCapture { session } => {
                let checkins = self.checkins.clone();
                tokio::spawn(async move {
                    match checkins.request_capture(session).await {
                        Ok(view) => print_session_view(&view),
                        Err(err) => println!("capture: {err}"),
                    }
                });
                println!("capture requested for session {session}");
            }
            DeskCommand::Commit { session } => match self.checkins.commit(session) {
                Ok(check_in) => println!(
                    "checked in: room {} plate {} ({})",
                    check_in.room,
                    check_in.license_plate,
                    check_in.reservation_id.as_deref().unwrap_or("walk-in"),
                ),
                Err(err) => println!("rejected: {err}"),
            },
            DeskCommand::RequestTransfer(request) => match self.transfers.request(request) {
                Ok(transfer) => println!(
                    "transfer {} pending: {} -> {}",
                    transfer.id, transfer.source, transfer.destination
                ),
                Err(err) => println!("rejected: {err}"),
            },
            DeskCommand::ResolveTransfer { id, outcome } => {
                match self.transfers.resolve(&id, outcome) {
                    Ok(transfer) => println!("transfer {} {}", transfer.id, transfer.status),
                    Err(err) => println!("rejected: {err}"),
                }
            }
            DeskCommand::PendingTransfers => {
                let pending = self.transfers.list_pending();
                if pending.is_empty() {
                    println!("no pending transfers");
                }
                for transfer in pending {
                    println!(
                        "{}  {} -> {}  {}  ({})",
                        transfer.id, transfer.source, transfer.destination,
                        transfer.reason, transfer.staff,
                    );
                }
            }
            DeskCommand::CreateTask(new_task) => match self.maintenance.create(new_task) {
                Ok(task) => println!("task {} pending for room {}", task.id, task.room),
                Err(err) => println!("rejected: {err}"),
            },
            DeskCommand::StartTask { id } => match self.maintenance.start(&id) {
                Ok(task) => println!("task {} in progress", task.id),
                Err(err) => println!("rejected: {err}"),
            },
            DeskCommand::CompleteTask { id, actual_cost } => {
                match self.maintenance.complete(&id, actual_cost) {
                    Ok(task) => println!("task {} completed", task.id),
                    Err(err) => println!("rejected: {err}"),
                }
            }
            DeskCommand::AssignTask { id, assignee } => {
                match self.maintenance.assign(&id, &assignee) {
                    Ok(task) => {
                        println!("task {} assigned to {}", task.id, assignee);
                    }
                    Err(err) => println!("rejected: {err}"),
                }
            }
            DeskCommand::ListTasks => {
                let tasks = self.maintenance.list(&TaskFilter::default());
                if tasks.is_empty() {
                    println!("no maintenance tasks");
                }
                for task in tasks {
                    println!(
                        "{}  {:<8} {:<11} room {:<5} {}  {}",
                        task.id,
                        task.priority.as_str(),
                        task.status.as_str(),
                        task.room,
                        task.assignee.as_deref().unwrap_or("-"),
                        task.description,
                    );
                }
            }
            DeskCommand::TaskStats => print_stats(&self.maintenance.stats()),
            DeskCommand::Rooms => {
                for room in self.registry.list_all() {
                    println!(
                        "{:<5} floor {}  {:<9} {}",
                        room.number,
                        room.floor,
                        room.room_type.as_str(),
                        room.status,
                    );
                }
            }
            DeskCommand::Refresh => self.spawn_refresh(),
            DeskCommand::Report { kind, range, module } => self.report(kind, &range, module),
            // run() consumes Shutdown before dispatch
            DeskCommand::Shutdown => {}
        }
    }

    /// Run a ledger refresh without blocking the command loop
    fn spawn_refresh(&self) {
        let ledger = self.ledger.clone();
        tokio::spawn(async move {
            match ledger.refresh().await {
                Ok(count) => println!("ledger refreshed: {count} reservations"),
                Err(err) => {
                    warn!(error = %err, "ledger_refresh_failed");
                    println!("refresh failed: {err} (keeping previous snapshot)");
                }
            }
        });
    }

    /// Print a report to the console and render it into the export dir
    fn report(&self, kind: ReportKind, range: &DateRange, module: Option<AuditModule>) {
        let text = match kind {
            ReportKind::Revenue => {
                let series = self.reports.revenue_series(range);
                for point in &series {
                    println!(
                        "{}  room {:>9.2}  service {:>8.2}  total {:>9.2}  occ {:>5.3}",
                        point.date,
                        point.room_revenue,
                        point.service_revenue,
                        point.total_revenue,
                        point.occupancy_rate,
                    );
                }
                to_delimited_text(&series, &revenue_columns())
            }
            ReportKind::Occupancy => {
                let series = self.reports.occupancy_series(range);
                for point in &series {
                    println!(
                        "{}  {}/{} occupied  adr {:>8.2}  revpar {:>8.2}",
                        point.date, point.occupied_rooms, point.total_rooms,
                        point.adr, point.revpar,
                    );
                }
                to_delimited_text(&series, &occupancy_columns())
            }
            ReportKind::Audit => {
                let entries = self.reports.audit_trail(range, module);
                for entry in &entries {
                    println!(
                        "{}  {:<11} {:<22} {}  {}",
                        entry.at.format("%Y-%m-%d %H:%M:%S"),
                        entry.module.as_str(),
                        entry.action,
                        entry.subject,
                        entry.detail,
                    );
                }
                to_delimited_text(&entries, &audit_columns())
            }
        };

        let file_name = format!("{}_{}_{}.csv", kind.as_str(), range.start, range.end);
        match text.and_then(|text| write_export(&self.export_dir, &file_name, &text)) {
            Ok(path) => println!("exported {}", path.display()),
            Err(err) => {
                error!(error = %err, "report_export_failed");
                println!("export failed: {err}");
            }
        }
    }

    fn print_session(&self, outcome: Result<SessionView>) {
        match outcome {
            Ok(view) => print_session_view(&view),
            Err(err) => println!("rejected: {err}"),
        }
    }
}

fn print_session_view(view: &SessionView) {
    let room = view.room.as_ref().map(|r| r.as_str()).unwrap_or("-");
    let plate = match (&view.plate, view.confidence) {
        (Some(plate), Some(confidence)) => format!("{plate} ({confidence:.2})"),
        (Some(plate), None) => plate.clone(),
        (None, _) => "-".to_string(),
    };
    println!(
        "session {}  [{}]  room {}  guest {}  plate {}  booking {}",
        view.session,
        view.phase,
        room,
        view.guest_name.as_deref().unwrap_or("-"),
        plate,
        view.reservation_id.as_deref().unwrap_or("-"),
    );
}

fn print_stats(stats: &MaintenanceStats) {
    println!(
        "tasks: {} pending, {} in progress, {} completed",
        stats.pending_tasks, stats.in_progress_tasks, stats.completed_tasks
    );
    println!(
        "priority: {} urgent, {} high, {} medium, {} low",
        stats.urgent, stats.high, stats.medium, stats.low
    );
    println!("outstanding estimates: {:.2}", stats.outstanding_estimate);
}
