use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::client::{ClientError, Result, TaskBackend};
use crate::models::{Task, TaskId};

pub(crate) fn task(id: i64, project: &str, activity: &str) -> Task {
    Task {
        id: TaskId(id),
        project_name: project.to_string(),
        activity_name: activity.to_string(),
        start: None,
    }
}

pub(crate) fn running(id: i64, project: &str, activity: &str, start: &str) -> Task {
    Task {
        start: Some(start.to_string()),
        ..task(id, project, activity)
    }
}

/// Scripted backend that records every call it receives.
pub(crate) struct FakeBackend {
    /// `None` makes `fetch_recent` fail.
    pub recent: Mutex<Option<Vec<Task>>>,
    /// `Err(())` makes `fetch_active` fail.
    pub active: Mutex<std::result::Result<Option<Task>, ()>>,
    pub fail_actions: Mutex<bool>,
    pub calls: Mutex<Vec<String>>,
    /// Delay before each fetch returns.
    pub latency: Duration,
    /// Answer `fetch_active` with a task whose id is the number of active
    /// fetches so far.
    pub numbered_active: bool,
}

impl FakeBackend {
    pub fn new(recent: Vec<Task>, active: Option<Task>) -> Self {
        Self {
            recent: Mutex::new(Some(recent)),
            active: Mutex::new(Ok(active)),
            fail_actions: Mutex::new(false),
            calls: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
            numbered_active: false,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl TaskBackend for FakeBackend {
    fn fetch_recent(&self, limit: usize) -> Result<Vec<Task>> {
        self.record("recent".to_string());
        thread::sleep(self.latency);
        match self.recent.lock().unwrap().as_ref() {
            Some(tasks) => Ok(tasks.iter().take(limit).cloned().collect()),
            None => Err(ClientError::Transport("connection refused".to_string())),
        }
    }

    fn fetch_active(&self) -> Result<Option<Task>> {
        self.record("active".to_string());
        thread::sleep(self.latency);
        if self.numbered_active {
            let n = self.count("active") as i64;
            return Ok(Some(running(n, "Acme", "Review", "2024-01-01T10:00:00+0000")));
        }
        match self.active.lock().unwrap().as_ref() {
            Ok(task) => Ok(task.clone()),
            Err(()) => Err(ClientError::Decode("expected value at line 1".to_string())),
        }
    }

    fn restart(&self, id: TaskId) -> Result<()> {
        self.record(format!("restart {id}"));
        if *self.fail_actions.lock().unwrap() {
            return Err(ClientError::Transport("timed out".to_string()));
        }
        let mut active = self.active.lock().unwrap();
        let recent = self.recent.lock().unwrap();
        let restarted = recent
            .as_ref()
            .and_then(|tasks| tasks.iter().find(|t| t.id == id))
            .cloned();
        if let Some(task) = restarted {
            *active = Ok(Some(Task {
                start: Some("2024-01-01T10:00:00+0000".to_string()),
                ..task
            }));
        }
        Ok(())
    }

    fn stop(&self, id: TaskId) -> Result<()> {
        self.record(format!("stop {id}"));
        if *self.fail_actions.lock().unwrap() {
            return Err(ClientError::Transport("timed out".to_string()));
        }
        *self.active.lock().unwrap() = Ok(None);
        Ok(())
    }
}
