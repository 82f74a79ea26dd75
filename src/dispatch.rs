//! Sends restart/stop requests and resynchronizes after the ones that succeed.

use std::fmt;
use std::sync::Arc;

use crate::client::TaskBackend;
use crate::models::{MenuState, TaskId};
use crate::sync::{StateSink, Synchronizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Restart(TaskId),
    Stop(TaskId),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Restart(id) => write!(f, "restart {id}"),
            Action::Stop(id) => write!(f, "stop {id}"),
        }
    }
}

pub struct Dispatcher<B> {
    sync: Arc<Synchronizer<B>>,
    sink: Arc<dyn StateSink>,
}

impl<B: TaskBackend> Clone for Dispatcher<B> {
    fn clone(&self) -> Self {
        Self {
            sync: Arc::clone(&self.sync),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<B: TaskBackend> Dispatcher<B> {
    pub fn new(sync: Arc<Synchronizer<B>>, sink: Arc<dyn StateSink>) -> Self {
        Self { sync, sink }
    }

    /// Perform `action` once. Returns whether the service accepted it.
    ///
    /// Success is followed by exactly one synchronization pass; failure leaves
    /// the displayed state alone.
    pub fn dispatch(&self, action: Action) -> bool {
        let backend = self.sync.backend();
        let result = match action {
            Action::Restart(id) => backend.restart(id),
            Action::Stop(id) => backend.stop(id),
        };
        match result {
            Ok(()) => {
                log::info!("{action} succeeded");
                self.refresh();
                true
            }
            Err(e) => {
                log::warn!("{action} failed: {e}");
                false
            }
        }
    }

    /// Run one synchronization pass and publish it.
    pub fn refresh(&self) -> MenuState {
        self.sync.run_pass(self.sink.as_ref())
    }
}
