//! Fetches remote state and reconciles it into a [`MenuState`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::client::TaskBackend;
use crate::models::{MenuState, RECENT_LIMIT};

/// Receives every state a synchronization pass produces, in pass order.
pub trait StateSink: Send + Sync {
    fn publish(&self, state: MenuState);
}

impl<F> StateSink for F
where
    F: Fn(MenuState) + Send + Sync,
{
    fn publish(&self, state: MenuState) {
        self(state)
    }
}

/// Sole writer of the process-wide [`MenuState`].
///
/// A failed recent fetch keeps the previously fetched list (empty before the
/// first success). A failed active fetch always clears the active task, so the
/// tray never shows something as running that may have stopped.
pub struct Synchronizer<B> {
    backend: Arc<B>,
    last: Mutex<MenuState>,
}

impl<B: TaskBackend> Synchronizer<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            last: Mutex::new(MenuState::default()),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Fetch recent and active tasks and return the reconciled state.
    ///
    /// Never fails: fetch errors are logged and degrade to the fallback above.
    pub fn synchronize(&self) -> MenuState {
        self.pass(|_| {})
    }

    /// Synchronize and publish while still holding the pass lock, so sinks see
    /// states in the order they were computed.
    pub fn run_pass<S>(&self, sink: &S) -> MenuState
    where
        S: StateSink + ?Sized,
    {
        self.pass(|state| sink.publish(state.clone()))
    }

    pub fn last_state(&self) -> MenuState {
        self.lock().clone()
    }

    /// One locked pass: fetch, store, then hand the state to `publish` before
    /// the lock is released.
    fn pass(&self, publish: impl FnOnce(&MenuState)) -> MenuState {
        let mut last = self.lock();
        let state = self.reconcile(&last);
        *last = state.clone();
        publish(&state);
        state
    }

    fn lock(&self) -> MutexGuard<'_, MenuState> {
        self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reconcile(&self, previous: &MenuState) -> MenuState {
        let recent = match self.backend.fetch_recent(RECENT_LIMIT) {
            Ok(tasks) => tasks,
            Err(e) => {
                log::warn!("fetching recent tasks failed, keeping previous list: {e}");
                previous.recent.clone()
            }
        };

        let active = match self.backend.fetch_active() {
            Ok(Some(task)) => Some(task),
            Ok(None) => {
                log::debug!("no active task");
                None
            }
            Err(e) => {
                log::warn!("fetching active task failed: {e}");
                None
            }
        };

        let state = MenuState::new(recent, active);
        log::info!(
            "synchronized: {} recent, active {}",
            state.recent.len(),
            state
                .active
                .as_ref()
                .map(|t| t.id.to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        state
    }
}
