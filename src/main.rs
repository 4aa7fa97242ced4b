//! Front desk coordinator - hotel room, check-in, and maintenance console
//!
//! Module structure:
//! - `domain/` - Core business types (Room, Reservation, CheckIn, Transfer, Task)
//! - `io/` - External interfaces (reservation feed, plate capture, console, export)
//! - `services/` - Business logic (Registry, Ledger, CheckIn, Transfers, Maintenance, Reports)
//! - `infra/` - Infrastructure (Config, Audit, Events)

use clap::Parser;
use frontdesk::infra::{AuditLog, Config, EventHub, ReservationMode};
use frontdesk::io::capture::{PlateRecognizer, SimulatedRecognizer};
use frontdesk::io::reservations::{HttpReservationSource, ReservationSource, SeedReservationSource};
use frontdesk::io::rooms::{ConfigRoomSource, RoomSource};
use frontdesk::services::{
    CheckInCoordinator, DeskCommand, FrontDesk, MaintenanceWorkflow, ReportAggregator,
    ReservationLedger, RoomRegistry, TransferWorkflow,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Front desk coordinator - room, check-in, and maintenance operations console
#[derive(Parser, Debug)]
#[command(name = "frontdesk", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG overrides the default info level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    info!(build = env!("GIT_HASH"), "frontdesk starting");

    let args = Args::parse();
    let config = Config::load_from_path(&args.config);

    info!(
        config_file = %config.config_file(),
        hotel = %config.hotel_id(),
        floors = %config.floors(),
        rooms_per_floor = %config.rooms_per_floor(),
        reservation_mode = ?config.reservation_mode(),
        refresh_interval_secs = %config.refresh_interval_secs(),
        export_dir = %config.export_dir(),
        "config_loaded"
    );

    let audit = Arc::new(AuditLog::new());
    let events = EventHub::default();

    // Seed the registry from the configured room grid
    let inventory = ConfigRoomSource::new(&config).load().await?;
    let registry = Arc::new(RoomRegistry::new(inventory, audit.clone(), events.clone()));

    // Reservation feed: live booking API or local seed data
    let source: Arc<dyn ReservationSource> = match config.reservation_mode() {
        ReservationMode::Http => Arc::new(HttpReservationSource::new(
            config.reservations_url(),
            std::time::Duration::from_secs(10),
        )?),
        ReservationMode::Seed => Arc::new(SeedReservationSource),
    };
    let ledger = Arc::new(ReservationLedger::new(source, audit.clone(), events.clone()));

    // First snapshot before the desk opens; a cold cache is still usable
    if let Err(err) = ledger.refresh().await {
        warn!(error = %err, "initial_ledger_refresh_failed");
    }

    let recognizer: Arc<dyn PlateRecognizer> = Arc::new(SimulatedRecognizer::new(&config));
    let checkins = Arc::new(CheckInCoordinator::new(
        registry.clone(),
        ledger.clone(),
        recognizer,
        &config,
        audit.clone(),
        events.clone(),
    ));
    let transfers =
        Arc::new(TransferWorkflow::new(registry.clone(), audit.clone(), events.clone()));
    let maintenance =
        Arc::new(MaintenanceWorkflow::new(registry.clone(), audit.clone(), events.clone()));
    let reports = Arc::new(ReportAggregator::new(
        registry.clone(),
        checkins.clone(),
        maintenance.clone(),
        audit.clone(),
    ));

    let desk = FrontDesk::new(registry, ledger, checkins, transfers, maintenance, reports, &config);

    // Command channel (bounded for backpressure)
    let (command_tx, command_rx) = mpsc::channel(64);

    // Operator console on stdin
    let console_tx = command_tx.clone();
    tokio::spawn(async move {
        frontdesk::io::console::read_commands(console_tx).await;
    });

    // Ctrl+C drains into the same shutdown path as 'quit'
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("shutdown_signal_received");
        let _ = command_tx.send(DeskCommand::Shutdown).await;
    });

    println!("front desk ready (type 'help' for commands)");
    desk.run(command_rx).await;

    info!("frontdesk shutdown complete");
    Ok(())
}
