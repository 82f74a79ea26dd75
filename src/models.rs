//! Task and menu state types, plus the timesheet records the service returns.

use std::fmt;

use serde::Deserialize;

/// Number of recent tasks shown in the tray and requested from the service.
pub const RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A timesheet record as fetched from the service. Never mutated after a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub project_name: String,
    pub activity_name: String,
    /// Raw `begin` timestamp, kept only for the active task.
    pub start: Option<String>,
}

impl Task {
    /// Display label, e.g. "[Acme] Development"
    pub fn label(&self) -> String {
        format!("[{}] {}", self.project_name, self.activity_name)
    }

    /// Copy of this task without its start instant
    pub(crate) fn without_start(self) -> Self {
        Self {
            start: None,
            ..self
        }
    }
}

/// Snapshot of the remote state the tray renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuState {
    /// Most recent first, at most `RECENT_LIMIT` long.
    pub recent: Vec<Task>,
    pub active: Option<Task>,
}

impl MenuState {
    pub fn new(mut recent: Vec<Task>, active: Option<Task>) -> Self {
        recent.truncate(RECENT_LIMIT);
        Self { recent, active }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Named {
    #[serde(default)]
    name: String,
}

/// Wire shape of `/recent` and `/active` array elements.
#[derive(Debug, Deserialize)]
pub(crate) struct TimesheetRecord {
    id: TaskId,
    #[serde(default)]
    project: Named,
    #[serde(default)]
    activity: Named,
    #[serde(default)]
    begin: Option<String>,
}

impl From<TimesheetRecord> for Task {
    fn from(record: TimesheetRecord) -> Self {
        Self {
            id: record.id,
            project_name: record.project.name,
            activity_name: record.activity.name,
            start: record.begin,
        }
    }
}
