//! Maintenance Workflow - room repair tasks from report to completion
//!
//! Tasks only move forward: pending -> in_progress -> completed. Stats are
//! computed from the task list on every read, so they can never lag a
//! mutation. Room status effects are best-effort; the task record is the
//! authority on the work itself.

use crate::domain::error::{DeskError, Result};
use crate::domain::maintenance::{
    MaintenanceStats, MaintenanceTask, NewTask, TaskFilter, TaskPatch, TaskPriority, TaskStatus,
};
use crate::domain::types::RoomEvent;
use crate::infra::audit::{AuditLog, AuditModule};
use crate::infra::events::{EventHub, StateChange};
use crate::services::registry::RoomRegistry;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

pub struct MaintenanceWorkflow {
    registry: Arc<RoomRegistry>,
    tasks: Mutex<Vec<MaintenanceTask>>,
    audit: Arc<AuditLog>,
    events: EventHub,
}

impl MaintenanceWorkflow {
    pub fn new(registry: Arc<RoomRegistry>, audit: Arc<AuditLog>, events: EventHub) -> Self {
        Self { registry, tasks: Mutex::new(Vec::new()), audit, events }
    }

    /// File a pending task against an existing room
    ///
    /// Filing has no room status effect; that waits for `start`.
    pub fn create(&self, new_task: NewTask) -> Result<MaintenanceTask> {
        if new_task.description.trim().is_empty() {
            return Err(DeskError::MissingField("description"));
        }
        self.registry.get(&new_task.room)?;

        let task = new_task.into_pending(Utc::now());
        self.tasks.lock().push(task.clone());

        info!(task = %task.id, room = %task.room, priority = %task.priority, "task_created");
        self.audit.record(
            AuditModule::Maintenance,
            "task_created",
            &task.id,
            Some(&task.reporter),
            format!("{} {} in {}: {}", task.priority, task.kind, task.room, task.description),
        );
        self.publish(&task);
        Ok(task)
    }

    /// Move a pending task to in_progress
    ///
    /// Also asks the registry to flag the room for maintenance; if the room
    /// is occupied that flagging is skipped and the task proceeds anyway.
    pub fn start(&self, id: &str) -> Result<MaintenanceTask> {
        let task = self.advance(id, TaskStatus::Pending, |task, now| {
            task.status = TaskStatus::InProgress;
            task.started_at = Some(now);
        })?;

        if let Err(err) = self.registry.apply_transition(&task.room, RoomEvent::MaintenanceOpened) {
            debug!(task = %task.id, room = %task.room, error = %err, "room_not_flagged");
        }

        info!(task = %task.id, room = %task.room, "task_started");
        self.audit.record(AuditModule::Maintenance, "task_started", &task.id, None, "in_progress");
        self.publish(&task);
        Ok(task)
    }

    /// Close an in_progress task, recording what the work actually cost
    pub fn complete(&self, id: &str, actual_cost: Option<f64>) -> Result<MaintenanceTask> {
        let task = self.advance(id, TaskStatus::InProgress, |task, now| {
            task.status = TaskStatus::Completed;
            task.completed_at = Some(now);
            task.actual_cost = actual_cost;
        })?;

        if let Err(err) = self.registry.apply_transition(&task.room, RoomEvent::MaintenanceClosed) {
            debug!(task = %task.id, room = %task.room, error = %err, "room_not_cleared");
        }

        info!(task = %task.id, room = %task.room, "task_completed");
        let detail = match actual_cost {
            Some(cost) => format!("actual cost {cost:.2}"),
            None => "no cost recorded".to_string(),
        };
        self.audit.record(AuditModule::Maintenance, "task_completed", &task.id, None, detail);
        self.publish(&task);
        Ok(task)
    }

    /// Hand a task to someone; allowed any time before completion
    pub fn assign(&self, id: &str, assignee: &str) -> Result<MaintenanceTask> {
        let task = self.amend(id, |task| {
            task.assignee = Some(assignee.to_string());
            Ok(())
        })?;

        self.audit.record(AuditModule::Maintenance, "task_assigned", &task.id, None, assignee);
        self.publish(&task);
        Ok(task)
    }

    /// Edit task fields in place; completed tasks are frozen
    pub fn update(&self, id: &str, patch: TaskPatch) -> Result<MaintenanceTask> {
        let task = self.amend(id, |task| {
            if let Some(description) = patch.description {
                if description.trim().is_empty() {
                    return Err(DeskError::MissingField("description"));
                }
                task.description = description.trim().to_string();
            }
            if let Some(kind) = patch.kind {
                task.kind = kind;
            }
            if let Some(priority) = patch.priority {
                task.priority = priority;
            }
            if let Some(assignee) = patch.assignee {
                task.assignee = Some(assignee);
            }
            if let Some(estimate) = patch.estimated_cost {
                task.estimated_cost = Some(estimate);
            }
            Ok(())
        })?;

        self.audit
            .record(AuditModule::Maintenance, "task_updated", &task.id, None, "fields edited");
        self.publish(&task);
        Ok(task)
    }

    /// Tasks matching the filter, most urgent first, oldest first within a tier
    pub fn list(&self, filter: &TaskFilter) -> Vec<MaintenanceTask> {
        let mut tasks: Vec<MaintenanceTask> =
            self.tasks.lock().iter().filter(|t| filter.matches(t)).cloned().collect();
        tasks.sort_by(|a, b| {
            b.priority.cmp(&a.priority).then_with(|| a.reported_at.cmp(&b.reported_at))
        });
        tasks
    }

    pub fn get(&self, id: &str) -> Result<MaintenanceTask> {
        self.tasks
            .lock()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| DeskError::not_found("task", id))
    }

    /// Workload counters, recomputed from the live task list
    pub fn stats(&self) -> MaintenanceStats {
        let tasks = self.tasks.lock();
        let mut stats = MaintenanceStats::default();
        for task in tasks.iter() {
            match task.status {
                TaskStatus::Pending => stats.pending_tasks += 1,
                TaskStatus::InProgress => stats.in_progress_tasks += 1,
                TaskStatus::Completed => stats.completed_tasks += 1,
            }
            match task.priority {
                TaskPriority::Low => stats.low += 1,
                TaskPriority::Medium => stats.medium += 1,
                TaskPriority::High => stats.high += 1,
                TaskPriority::Urgent => stats.urgent += 1,
            }
            if task.status != TaskStatus::Completed {
                if let Some(estimate) = task.estimated_cost {
                    stats.outstanding_estimate += estimate;
                }
            }
        }
        stats
    }

    /// Completed tasks are the cost input for service revenue
    pub fn completed(&self) -> Vec<MaintenanceTask> {
        self.tasks
            .lock()
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .cloned()
            .collect()
    }

    /// Shared forward-only step: the task must be exactly `from`
    fn advance(
        &self,
        id: &str,
        from: TaskStatus,
        apply: impl FnOnce(&mut MaintenanceTask, chrono::DateTime<Utc>),
    ) -> Result<MaintenanceTask> {
        let mut tasks = self.tasks.lock();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| DeskError::not_found("task", id))?;
        if task.status != from {
            return Err(match from {
                TaskStatus::Pending => DeskError::NotPending { id: id.to_string() },
                _ => DeskError::NotInProgress { id: id.to_string() },
            });
        }
        apply(task, Utc::now());
        Ok(task.clone())
    }

    /// Shared non-status edit: anything goes until the task is terminal
    fn amend(
        &self,
        id: &str,
        apply: impl FnOnce(&mut MaintenanceTask) -> Result<()>,
    ) -> Result<MaintenanceTask> {
        let mut tasks = self.tasks.lock();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| DeskError::not_found("task", id))?;
        if task.status.is_terminal() {
            return Err(DeskError::TaskCompleted { id: id.to_string() });
        }
        apply(task)?;
        Ok(task.clone())
    }

    fn publish(&self, task: &MaintenanceTask) {
        self.events.publish(StateChange::TaskUpdated {
            task: task.id.clone(),
            room: task.room.clone(),
            status: task.status,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use crate::domain::maintenance::TaskKind;
    use crate::domain::types::{Room, RoomEvent, RoomId, RoomStatus, RoomType};

    fn registry() -> Arc<RoomRegistry> {
        let rooms = vec![
            Room::new("frontdesk", RoomId::from("101"), 1, RoomType::Standard),
            Room::new("frontdesk", RoomId::from("102"), 1, RoomType::Standard),
        ];
        Arc::new(RoomRegistry::new(rooms, Arc::new(AuditLog::new()), EventHub::new(8)))
    }

    fn workflow(registry: Arc<RoomRegistry>) -> MaintenanceWorkflow {
        MaintenanceWorkflow::new(registry, Arc::new(AuditLog::new()), EventHub::new(8))
    }

    fn task(room: &str, kind: TaskKind, priority: TaskPriority, description: &str) -> NewTask {
        NewTask::new(RoomId::from(room), kind, priority, "dana", description)
    }

    fn leaky_faucet(room: &str) -> NewTask {
        task(room, TaskKind::Repair, TaskPriority::High, "leaky faucet")
    }

    #[test]
    fn test_lifecycle_moves_forward_only() {
        let registry = registry();
        let workflow = workflow(registry.clone());

        let filed = workflow.create(leaky_faucet("101")).unwrap();
        assert_eq!(filed.status, TaskStatus::Pending);
        assert_eq!(registry.get(&RoomId::from("101")).unwrap().status, RoomStatus::Vacant);

        let filed = workflow.start(&filed.id).unwrap();
        assert_eq!(filed.status, TaskStatus::InProgress);
        assert!(filed.started_at.is_some());
        assert_eq!(registry.get(&RoomId::from("101")).unwrap().status, RoomStatus::Maintenance);

        let filed = workflow.complete(&filed.id, Some(180.0)).unwrap();
        assert_eq!(filed.status, TaskStatus::Completed);
        assert_eq!(filed.actual_cost, Some(180.0));
        assert_eq!(registry.get(&RoomId::from("101")).unwrap().status, RoomStatus::Vacant);
    }

    #[test]
    fn test_cannot_skip_or_rewind_status() {
        let workflow = workflow(registry());
        let filed = workflow.create(leaky_faucet("101")).unwrap();

        // pending task cannot complete
        let err = workflow.complete(&filed.id, None).unwrap_err();
        assert_eq!(err, DeskError::NotInProgress { id: filed.id.clone() });

        workflow.start(&filed.id).unwrap();
        // in_progress task cannot start again
        let err = workflow.start(&filed.id).unwrap_err();
        assert_eq!(err, DeskError::NotPending { id: filed.id.clone() });

        workflow.complete(&filed.id, None).unwrap();
        // completed task is frozen
        let err = workflow.complete(&filed.id, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        let err = workflow.assign(&filed.id, "sam").unwrap_err();
        assert_eq!(err, DeskError::TaskCompleted { id: filed.id.clone() });
    }

    #[test]
    fn test_create_requires_description_and_room() {
        let workflow = workflow(registry());

        let blank = task("101", TaskKind::Repair, TaskPriority::Low, "  ");
        assert_eq!(workflow.create(blank).unwrap_err(), DeskError::MissingField("description"));

        let ghost = leaky_faucet("999");
        assert!(matches!(workflow.create(ghost).unwrap_err(), DeskError::NotFound { .. }));
        assert!(workflow.list(&TaskFilter::default()).is_empty());
    }

    #[test]
    fn test_start_on_occupied_room_proceeds_without_flagging() {
        let registry = registry();
        registry.apply_transition(&RoomId::from("101"), RoomEvent::CheckInCommitted).unwrap();
        let workflow = workflow(registry.clone());

        let filed = workflow.create(leaky_faucet("101")).unwrap();
        let filed = workflow.start(&filed.id).unwrap();

        assert_eq!(filed.status, TaskStatus::InProgress);
        assert_eq!(registry.get(&RoomId::from("101")).unwrap().status, RoomStatus::Occupied);
    }

    #[test]
    fn test_stats_track_every_mutation() {
        let workflow = workflow(registry());
        let urgent = task("101", TaskKind::Repair, TaskPriority::Urgent, "no heat");
        let urgent = workflow.create(urgent.with_estimate(250.0)).unwrap();
        let low = task("102", TaskKind::Inspection, TaskPriority::Low, "routine");
        let low = workflow.create(low.with_estimate(40.0)).unwrap();

        let stats = workflow.stats();
        assert_eq!(stats.pending_tasks, 2);
        assert_eq!(stats.urgent, 1);
        assert_eq!(stats.low, 1);
        assert_eq!(stats.outstanding_estimate, 290.0);

        workflow.start(&urgent.id).unwrap();
        workflow.complete(&urgent.id, Some(180.0)).unwrap();

        let stats = workflow.stats();
        assert_eq!(stats.pending_tasks, 1);
        assert_eq!(stats.completed_tasks, 1);
        // the completed estimate drops out, the actual cost never enters
        assert_eq!(stats.outstanding_estimate, 40.0);

        workflow.start(&low.id).unwrap();
        assert_eq!(workflow.stats().in_progress_tasks, 1);
    }

    #[test]
    fn test_list_sorted_by_priority_then_age() {
        let workflow = workflow(registry());
        let first_low =
            workflow.create(task("101", TaskKind::Repair, TaskPriority::Low, "scuff")).unwrap();
        let urgent =
            workflow.create(task("102", TaskKind::Repair, TaskPriority::Urgent, "flood")).unwrap();
        let second_low =
            workflow.create(task("102", TaskKind::Repair, TaskPriority::Low, "bulb")).unwrap();

        let listed = workflow.list(&TaskFilter::default());
        assert_eq!(listed[0].id, urgent.id);
        assert_eq!(listed[1].id, first_low.id);
        assert_eq!(listed[2].id, second_low.id);

        let filter = TaskFilter { priority: Some(TaskPriority::Urgent), ..Default::default() };
        assert_eq!(workflow.list(&filter).len(), 1);
    }

    #[test]
    fn test_update_patches_fields() {
        let workflow = workflow(registry());
        let filed = workflow.create(leaky_faucet("101")).unwrap();

        let patch = TaskPatch {
            description: Some("faucet replaced entirely".to_string()),
            priority: Some(TaskPriority::Urgent),
            estimated_cost: Some(95.0),
            ..Default::default()
        };
        let filed = workflow.update(&filed.id, patch).unwrap();
        assert_eq!(filed.description, "faucet replaced entirely");
        assert_eq!(filed.priority, TaskPriority::Urgent);
        assert_eq!(filed.estimated_cost, Some(95.0));

        let blank = TaskPatch { description: Some("   ".to_string()), ..Default::default() };
        let err = workflow.update(&filed.id, blank).unwrap_err();
        assert_eq!(err, DeskError::MissingField("description"));
    }
}
