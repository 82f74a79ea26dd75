//! Turns a [`MenuState`] into tray entries and the actions their clicks trigger.
//!
//! Every rebuild bumps a generation counter that is baked into the entry ids.
//! The previous generation's bindings are dropped before the new ones are
//! installed, so a click that arrives for an entry from an older menu resolves
//! to nothing instead of acting on whatever task now sits in that slot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::dispatch::Action;
use crate::duration;
use crate::models::{MenuState, Task};

pub const STOP_LABEL: &str = "Stop";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Recent,
    Active,
}

/// What the surface needs to draw one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub id: String,
    pub label: String,
    pub clickable: bool,
}

/// Summary for the status icon and its tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrayStatus {
    pub running: bool,
    pub tooltip: String,
}

/// The drawing side of the tray: the engine tells it what to show and it
/// reports clicks back by entry id.
pub trait MenuSurface {
    /// Remove every entry previously placed in `group` and show `entries` instead.
    fn replace_entries(&mut self, group: Group, entries: &[EntryView]);
    fn set_group_enabled(&mut self, group: Group, enabled: bool);
    fn show_status(&mut self, status: &TrayStatus);
    /// Change the text of an entry already on screen, leaving its binding alone.
    fn set_label(&mut self, entry_id: &str, label: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    pub group: Group,
    pub view: EntryView,
    /// The task this entry was built from, captured at rebuild time.
    pub task: Option<Task>,
    pub action: Option<Action>,
}

#[derive(Debug, Default)]
pub struct MenuEngine {
    generation: u64,
    entries: Vec<RenderedEntry>,
    bindings: HashMap<String, Action>,
}

impl MenuEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Entries of the current generation, recent first
    pub fn entries(&self) -> &[RenderedEntry] {
        &self.entries
    }

    /// Action bound to a clicked entry, if it belongs to the current generation.
    pub fn resolve(&self, entry_id: &str) -> Option<Action> {
        self.bindings.get(entry_id).copied()
    }

    pub fn rebuild<S: MenuSurface + ?Sized>(&mut self, state: &MenuState, surface: &mut S) {
        self.rebuild_at(state, surface, Utc::now())
    }

    /// Rebuild with an explicit clock for the active task's duration.
    pub fn rebuild_at<S: MenuSurface + ?Sized>(
        &mut self,
        state: &MenuState,
        surface: &mut S,
        now: DateTime<Utc>,
    ) {
        // Retire the old generation before anything new becomes clickable.
        self.bindings.clear();
        self.entries.clear();
        self.generation += 1;
        let generation = self.generation;

        let mut entries: Vec<RenderedEntry> = state
            .recent
            .iter()
            .enumerate()
            .map(|(slot, task)| RenderedEntry {
                group: Group::Recent,
                view: EntryView {
                    id: format!("recent-{generation}-{slot}"),
                    label: task.label(),
                    clickable: true,
                },
                task: Some(task.clone()),
                action: Some(Action::Restart(task.id)),
            })
            .collect();

        let status = match &state.active {
            Some(task) => {
                let label = active_label(task, now);
                entries.push(RenderedEntry {
                    group: Group::Active,
                    view: EntryView {
                        id: format!("active-{generation}"),
                        label: label.clone(),
                        clickable: false,
                    },
                    task: Some(task.clone()),
                    action: None,
                });
                entries.push(RenderedEntry {
                    group: Group::Active,
                    view: EntryView {
                        id: format!("stop-{generation}"),
                        label: STOP_LABEL.to_string(),
                        clickable: true,
                    },
                    task: Some(task.clone()),
                    action: Some(Action::Stop(task.id)),
                });
                TrayStatus {
                    running: true,
                    tooltip: format!("Kimai - {label}"),
                }
            }
            None => TrayStatus {
                running: false,
                tooltip: "Kimai - no active task".to_string(),
            },
        };

        surface.replace_entries(Group::Recent, &views_in(&entries, Group::Recent));
        surface.replace_entries(Group::Active, &views_in(&entries, Group::Active));
        surface.set_group_enabled(Group::Recent, !state.recent.is_empty());
        surface.set_group_enabled(Group::Active, state.active.is_some());
        surface.show_status(&status);

        self.bindings = entries
            .iter()
            .filter_map(|e| e.action.map(|a| (e.view.id.clone(), a)))
            .collect();
        self.entries = entries;
        log::debug!(
            "rebuilt menu generation {} with {} bindings",
            generation,
            self.bindings.len()
        );
    }

    pub fn refresh_elapsed<S: MenuSurface + ?Sized>(&mut self, surface: &mut S) {
        self.refresh_elapsed_at(surface, Utc::now())
    }

    /// Re-render the active task's duration and the tooltip for `now`.
    ///
    /// Works on the current generation only: nothing is fetched, no entry is
    /// added or removed and every binding stays valid.
    pub fn refresh_elapsed_at<S: MenuSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        now: DateTime<Utc>,
    ) {
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.group == Group::Active && e.action.is_none())
        else {
            return;
        };
        let Some(task) = &entry.task else {
            return;
        };
        let label = active_label(task, now);
        if label == entry.view.label {
            return;
        }
        surface.set_label(&entry.view.id, &label);
        surface.show_status(&TrayStatus {
            running: true,
            tooltip: format!("Kimai - {label}"),
        });
        entry.view.label = label;
    }
}

fn views_in(entries: &[RenderedEntry], group: Group) -> Vec<EntryView> {
    entries
        .iter()
        .filter(|e| e.group == group)
        .map(|e| e.view.clone())
        .collect()
}

/// "[project] activity (H:M h)"
fn active_label(task: &Task, now: DateTime<Utc>) -> String {
    let elapsed = match &task.start {
        Some(start) => duration::format_elapsed(start, now),
        None => duration::INVALID_DURATION.to_string(),
    };
    format!("{} ({})", task.label(), elapsed)
}
