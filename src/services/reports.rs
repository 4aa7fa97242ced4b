//! Report Aggregator - date-windowed series over committed facts
//!
//! Everything here is a pure read: committed check-ins, completed
//! maintenance tasks and the audit log in, series out. A stay occupies
//! its room from the check-in date up to (not including) departure, with
//! a minimum of one night. Ratios fall back to 0 instead of dividing by
//! zero, so a day with no guests never yields NaN.

use crate::domain::checkin::CheckIn;
use crate::domain::error::{DeskError, Result};
use crate::domain::maintenance::MaintenanceTask;
use crate::infra::audit::{AuditEntry, AuditLog, AuditModule};
use crate::io::export::Column;
use crate::services::checkin::CheckInCoordinator;
use crate::services::maintenance::MaintenanceWorkflow;
use crate::services::registry::RoomRegistry;
use chrono::{Duration, NaiveDate};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::sync::Arc;

/// Closed date range, both endpoints included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DeskError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenuePoint {
    pub date: NaiveDate,
    pub room_revenue: f64,
    pub service_revenue: f64,
    pub total_revenue: f64,
    pub occupancy_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OccupancyPoint {
    pub date: NaiveDate,
    pub total_rooms: usize,
    pub occupied_rooms: usize,
    pub available_rooms: usize,
    pub occupancy_rate: f64,
    pub adr: f64,
    pub revpar: f64,
}

pub struct ReportAggregator {
    registry: Arc<RoomRegistry>,
    checkins: Arc<CheckInCoordinator>,
    maintenance: Arc<MaintenanceWorkflow>,
    audit: Arc<AuditLog>,
}

impl ReportAggregator {
    pub fn new(
        registry: Arc<RoomRegistry>,
        checkins: Arc<CheckInCoordinator>,
        maintenance: Arc<MaintenanceWorkflow>,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self { registry, checkins, maintenance, audit }
    }

    /// Revenue per day: room nights plus maintenance work billed that day
    pub fn revenue_series(&self, range: &DateRange) -> Vec<RevenuePoint> {
        let stays = self.checkins.committed();
        let completed = self.maintenance.completed();
        let total_rooms = self.registry.count();

        range
            .days()
            .map(|date| {
                let facts = day_facts(&stays, &completed, date);
                RevenuePoint {
                    date,
                    room_revenue: facts.room_revenue,
                    service_revenue: facts.service_revenue,
                    total_revenue: facts.total_revenue(),
                    occupancy_rate: ratio(facts.occupied, total_rooms),
                }
            })
            .collect()
    }

    /// Occupancy per day with the derived ADR and RevPAR rates
    pub fn occupancy_series(&self, range: &DateRange) -> Vec<OccupancyPoint> {
        let stays = self.checkins.committed();
        let completed = self.maintenance.completed();
        let total_rooms = self.registry.count();

        range
            .days()
            .map(|date| {
                let facts = day_facts(&stays, &completed, date);
                let total_revenue = facts.total_revenue();
                let adr = if facts.occupied == 0 {
                    0.0
                } else {
                    total_revenue / facts.occupied as f64
                };
                let revpar =
                    if total_rooms == 0 { 0.0 } else { total_revenue / total_rooms as f64 };
                OccupancyPoint {
                    date,
                    total_rooms,
                    occupied_rooms: facts.occupied,
                    available_rooms: total_rooms - facts.occupied,
                    occupancy_rate: ratio(facts.occupied, total_rooms),
                    adr,
                    revpar,
                }
            })
            .collect()
    }

    /// Audit entries inside the range, most recent first
    pub fn audit_trail(&self, range: &DateRange, module: Option<AuditModule>) -> Vec<AuditEntry> {
        self.audit.query(range.start, range.end, module)
    }
}

struct DayFacts {
    occupied: usize,
    room_revenue: f64,
    service_revenue: f64,
}

impl DayFacts {
    fn total_revenue(&self) -> f64 {
        self.room_revenue + self.service_revenue
    }
}

fn day_facts(stays: &[CheckIn], completed: &[MaintenanceTask], date: NaiveDate) -> DayFacts {
    let mut rooms = FxHashSet::default();
    let mut room_revenue = 0.0;
    for stay in stays {
        let from = stay.checked_in_at.date_naive();
        // same-day departures still occupy the room for one night
        let until = stay.departure.max(from + Duration::days(1));
        if date >= from && date < until {
            rooms.insert(&stay.room);
            room_revenue += stay.nightly_rate;
        }
    }

    let service_revenue = completed
        .iter()
        .filter(|task| task.completed_at.map(|at| at.date_naive()) == Some(date))
        .filter_map(|task| task.actual_cost)
        .sum();

    DayFacts { occupied: rooms.len(), room_revenue, service_revenue }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Column layouts for the delimited exports
pub fn revenue_columns() -> Vec<Column<RevenuePoint>> {
    vec![
        Column::new("Date", |p| p.date.to_string()),
        Column::new("Room Revenue", |p| format!("{:.2}", p.room_revenue)),
        Column::new("Service Revenue", |p| format!("{:.2}", p.service_revenue)),
        Column::new("Total Revenue", |p| format!("{:.2}", p.total_revenue)),
        Column::new("Occupancy Rate", |p| format!("{:.3}", p.occupancy_rate)),
    ]
}

pub fn occupancy_columns() -> Vec<Column<OccupancyPoint>> {
    vec![
        Column::new("Date", |p| p.date.to_string()),
        Column::new("Total Rooms", |p| p.total_rooms.to_string()),
        Column::new("Occupied", |p| p.occupied_rooms.to_string()),
        Column::new("Available", |p| p.available_rooms.to_string()),
        Column::new("Occupancy Rate", |p| format!("{:.3}", p.occupancy_rate)),
        Column::new("ADR", |p| format!("{:.2}", p.adr)),
        Column::new("RevPAR", |p| format!("{:.2}", p.revpar)),
    ]
}

pub fn audit_columns() -> Vec<Column<AuditEntry>> {
    vec![
        Column::new("Time", |e| e.at.to_rfc3339()),
        Column::new("Module", |e| e.module.as_str().to_string()),
        Column::new("Action", |e| e.action.clone()),
        Column::new("Subject", |e| e.subject.clone()),
        Column::new("Staff", |e| e.staff.clone().unwrap_or_default()),
        Column::new("Detail", |e| e.detail.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::maintenance::{NewTask, TaskKind, TaskPriority};
    use crate::domain::types::{Room, RoomId, RoomType};
    use crate::infra::config::Config;
    use crate::infra::events::EventHub;
    use crate::io::capture::ScriptedRecognizer;
    use crate::io::reservations::SeedReservationSource;
    use crate::services::ledger::ReservationLedger;
    use chrono::Utc;

    struct Fixture {
        aggregator: ReportAggregator,
        desk: Arc<CheckInCoordinator>,
        maintenance: Arc<MaintenanceWorkflow>,
    }

    async fn fixture() -> Fixture {
        let audit = Arc::new(AuditLog::new());
        let events = EventHub::new(16);
        // 101 carries a confirmed seed booking, 110 has none
        let rooms = vec![
            Room::new("frontdesk", RoomId::from("101"), 1, RoomType::Standard),
            Room::new("frontdesk", RoomId::from("110"), 1, RoomType::Standard),
        ];
        let registry = Arc::new(RoomRegistry::new(rooms, audit.clone(), events.clone()));
        let ledger = Arc::new(ReservationLedger::new(
            Arc::new(SeedReservationSource),
            audit.clone(),
            events.clone(),
        ));
        ledger.refresh().await.unwrap();
        let desk = Arc::new(CheckInCoordinator::new(
            registry.clone(),
            ledger,
            Arc::new(ScriptedRecognizer::default()),
            &Config::default(),
            audit.clone(),
            events.clone(),
        ));
        let maintenance =
            Arc::new(MaintenanceWorkflow::new(registry.clone(), audit.clone(), events));
        let aggregator =
            ReportAggregator::new(registry, desk.clone(), maintenance.clone(), audit);
        Fixture { aggregator, desk, maintenance }
    }

    fn today_range() -> DateRange {
        let today = Utc::now().date_naive();
        DateRange::new(today, today).unwrap()
    }

    #[test]
    fn test_range_rejects_inverted_endpoints() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(DateRange::new(start, end).unwrap_err(), DeskError::InvalidRange);
    }

    #[test]
    fn test_range_days_are_inclusive() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let days: Vec<NaiveDate> = DateRange::new(start, end).unwrap().days().collect();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0], start);
        assert_eq!(days[2], end);
    }

    #[tokio::test]
    async fn test_empty_day_produces_finite_zeroes() {
        let fx = fixture().await;
        let series = fx.aggregator.occupancy_series(&today_range());

        assert_eq!(series.len(), 1);
        let point = &series[0];
        assert_eq!(point.occupied_rooms, 0);
        assert_eq!(point.available_rooms, 2);
        assert_eq!(point.adr, 0.0);
        assert_eq!(point.revpar, 0.0);
        assert!(point.adr.is_finite());
        assert!(point.revpar.is_finite());
        assert_eq!(point.occupancy_rate, 0.0);
    }

    #[tokio::test]
    async fn test_walk_in_shows_up_in_both_series() {
        let fx = fixture().await;
        let view = fx.desk.open_session("ines");
        fx.desk.select_room(view.session, &RoomId::from("110")).unwrap();
        fx.desk.enter_plate(view.session, "MX-917").unwrap();
        fx.desk.commit(view.session).unwrap();

        let rate = Config::default().walk_in_rate();
        let revenue = fx.aggregator.revenue_series(&today_range());
        assert_eq!(revenue[0].room_revenue, rate);
        assert_eq!(revenue[0].service_revenue, 0.0);
        assert_eq!(revenue[0].total_revenue, rate);
        assert_eq!(revenue[0].occupancy_rate, 0.5);

        let occupancy = fx.aggregator.occupancy_series(&today_range());
        assert_eq!(occupancy[0].occupied_rooms, 1);
        assert_eq!(occupancy[0].adr, rate);
        assert_eq!(occupancy[0].revpar, rate / 2.0);
    }

    #[tokio::test]
    async fn test_stay_occupies_until_departure_exclusive() {
        let fx = fixture().await;
        let view = fx.desk.open_session("ines");
        // bk-5001 attaches: two nights at 140
        fx.desk.select_room(view.session, &RoomId::from("101")).unwrap();
        fx.desk.enter_plate(view.session, "KJ-482").unwrap();
        fx.desk.commit(view.session).unwrap();

        let today = Utc::now().date_naive();
        let range = DateRange::new(today, today + Duration::days(2)).unwrap();
        let series = fx.aggregator.occupancy_series(&range);

        assert_eq!(series[0].occupied_rooms, 1);
        assert_eq!(series[1].occupied_rooms, 1);
        assert_eq!(series[2].occupied_rooms, 0);
        assert_eq!(series[0].adr, 140.0);
    }

    #[tokio::test]
    async fn test_completed_maintenance_counts_as_service_revenue() {
        let fx = fixture().await;
        let task = NewTask::new(
            RoomId::from("101"),
            TaskKind::Repair,
            TaskPriority::Urgent,
            "dana",
            "broken lock",
        );
        let task = fx.maintenance.create(task).unwrap();
        fx.maintenance.start(&task.id).unwrap();
        fx.maintenance.complete(&task.id, Some(80.0)).unwrap();

        let revenue = fx.aggregator.revenue_series(&today_range());
        assert_eq!(revenue[0].service_revenue, 80.0);
        assert_eq!(revenue[0].total_revenue, 80.0);
        // service work alone does not occupy rooms
        assert_eq!(revenue[0].occupancy_rate, 0.0);
    }

    #[tokio::test]
    async fn test_audit_trail_is_filtered_and_newest_first() {
        let fx = fixture().await;
        let view = fx.desk.open_session("ines");
        fx.desk.select_room(view.session, &RoomId::from("110")).unwrap();
        fx.desk.enter_plate(view.session, "MX-917").unwrap();
        fx.desk.commit(view.session).unwrap();

        let all = fx.aggregator.audit_trail(&today_range(), None);
        assert!(all.len() >= 2);
        for pair in all.windows(2) {
            assert!(pair[0].at >= pair[1].at);
        }

        let only_checkin = fx.aggregator.audit_trail(&today_range(), Some(AuditModule::CheckIn));
        assert_eq!(only_checkin.len(), 1);
        assert_eq!(only_checkin[0].action, "check_in_committed");
    }

    #[test]
    fn test_export_layout_matches_series_fields() {
        let sample = RevenuePoint {
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            room_revenue: 140.0,
            service_revenue: 0.0,
            total_revenue: 140.0,
            occupancy_rate: 0.5,
        };
        let columns = revenue_columns();
        assert_eq!(columns[0].label, "Date");
        assert_eq!((columns[1].cell)(&sample), "140.00");
        assert_eq!((columns[4].cell)(&sample), "0.500");
        assert_eq!(occupancy_columns().len(), 7);
        assert_eq!(audit_columns().len(), 6);
    }
}
