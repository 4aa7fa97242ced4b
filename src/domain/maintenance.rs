//! Maintenance tasks: repairs, replacements, inspections, preventive work

use crate::domain::types::{new_uuid_v7, RoomId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What kind of work a task covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Repair,
    Replacement,
    Inspection,
    Preventive,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Repair => "repair",
            TaskKind::Replacement => "replacement",
            TaskKind::Inspection => "inspection",
            TaskKind::Preventive => "preventive",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "repair" => Ok(TaskKind::Repair),
            "replacement" => Ok(TaskKind::Replacement),
            "inspection" => Ok(TaskKind::Inspection),
            "preventive" => Ok(TaskKind::Preventive),
            other => Err(format!("unknown task kind: {other}")),
        }
    }
}

/// Urgency of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            "urgent" => Ok(TaskPriority::Urgent),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Lifecycle status; transitions are forward-only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A maintenance task against a room
///
/// `started_at` appears on the transition into in_progress; `completed_at`
/// and `actual_cost` appear exactly on the transition into completed.
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceTask {
    pub id: String,
    pub room: RoomId,
    pub kind: TaskKind,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub assignee: Option<String>,
    pub reporter: String,
    pub reported_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
}

/// Input for filing a new task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub room: RoomId,
    pub kind: TaskKind,
    pub description: String,
    pub priority: TaskPriority,
    pub reporter: String,
    pub assignee: Option<String>,
    pub estimated_cost: Option<f64>,
}

impl NewTask {
    pub fn new(
        room: RoomId,
        kind: TaskKind,
        priority: TaskPriority,
        reporter: &str,
        description: &str,
    ) -> Self {
        Self {
            room,
            kind,
            description: description.to_string(),
            priority,
            reporter: reporter.to_string(),
            assignee: None,
            estimated_cost: None,
        }
    }

    pub fn with_assignee(mut self, assignee: &str) -> Self {
        self.assignee = Some(assignee.to_string());
        self
    }

    pub fn with_estimate(mut self, estimated_cost: f64) -> Self {
        self.estimated_cost = Some(estimated_cost);
        self
    }

    pub(crate) fn into_pending(self, now: DateTime<Utc>) -> MaintenanceTask {
        MaintenanceTask {
            id: new_uuid_v7(),
            room: self.room,
            kind: self.kind,
            description: self.description.trim().to_string(),
            priority: self.priority,
            status: TaskStatus::Pending,
            assignee: self.assignee,
            reporter: self.reporter,
            reported_at: now,
            started_at: None,
            completed_at: None,
            estimated_cost: self.estimated_cost,
            actual_cost: None,
        }
    }
}

/// Partial update applied to a non-terminal task
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub description: Option<String>,
    pub kind: Option<TaskKind>,
    pub priority: Option<TaskPriority>,
    pub assignee: Option<String>,
    pub estimated_cost: Option<f64>,
}

/// Optional filters for task listings
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub room: Option<RoomId>,
}

impl TaskFilter {
    pub(crate) fn matches(&self, task: &MaintenanceTask) -> bool {
        self.status.map_or(true, |s| task.status == s)
            && self.priority.map_or(true, |p| task.priority == p)
            && self.room.as_ref().map_or(true, |r| &task.room == r)
    }
}

/// Aggregate counters over the live task set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaintenanceStats {
    pub pending_tasks: usize,
    pub in_progress_tasks: usize,
    pub completed_tasks: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub urgent: usize,
    /// Sum of estimated cost across all non-completed tasks
    pub outstanding_estimate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_priority_parse() {
        assert_eq!("repair".parse::<TaskKind>().unwrap(), TaskKind::Repair);
        assert_eq!("preventive".parse::<TaskKind>().unwrap(), TaskKind::Preventive);
        assert!("paint".parse::<TaskKind>().is_err());

        assert_eq!("urgent".parse::<TaskPriority>().unwrap(), TaskPriority::Urgent);
        assert!("asap".parse::<TaskPriority>().is_err());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(TaskPriority::Urgent > TaskPriority::High);
        assert!(TaskPriority::High > TaskPriority::Medium);
        assert!(TaskPriority::Medium > TaskPriority::Low);
    }

    #[test]
    fn test_new_task_starts_pending() {
        let task = NewTask::new(
            RoomId::from("305"),
            TaskKind::Repair,
            TaskPriority::High,
            "ines",
            "shower drain clogged",
        )
        .with_assignee("sven")
        .with_estimate(80.0)
        .into_pending(Utc::now());

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.assignee.as_deref(), Some("sven"));
        assert_eq!(task.estimated_cost, Some(80.0));
        assert!(task.started_at.is_none());
        assert!(task.completed_at.is_none());
        assert!(task.actual_cost.is_none());
    }

    #[test]
    fn test_filter_matches() {
        let task = NewTask::new(
            RoomId::from("305"),
            TaskKind::Repair,
            TaskPriority::High,
            "ines",
            "shower drain clogged",
        )
        .into_pending(Utc::now());

        let all = TaskFilter::default();
        assert!(all.matches(&task));

        let by_room = TaskFilter { room: Some(RoomId::from("305")), ..Default::default() };
        assert!(by_room.matches(&task));

        let wrong_status =
            TaskFilter { status: Some(TaskStatus::Completed), ..Default::default() };
        assert!(!wrong_status.matches(&task));
    }
}
