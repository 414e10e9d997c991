// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped event firing.
//!
//! [`ModerateEvents`] swaps the container's `events` service for a
//! [`RecordingDispatcher`] while a probe runs, puts the original back, and
//! then replays the recorded events through the real dispatcher with only the
//! targeted listeners attached.
//!
//! Replaying is a filter, not a trigger: an event the probe never fired, or a
//! listener that was never attached, stays silent.
//!
//! Every event replayed (matching or not) has its listeners detached from the
//! real dispatcher first. Listeners of non-matching events stay detached
//! afterwards.

use super::{Event, EventArg, EventError, EventLog, RecordingDispatcher};
use crate::container::{BindingSnapshot, Container, EVENTS};
use glob::Pattern;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Listeners re-attached and fired for one event
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub listeners: Vec<String>,
}

/// Event identifier to the listeners fired for it
pub type Actions = BTreeMap<String, ActionRecord>;

/// Records, restores and selectively replays events fired through a container
pub struct ModerateEvents {
    container: Container,
    log: Arc<Mutex<EventLog>>,
    binding: Option<BindingSnapshot>,
    actions: Actions,
}

impl ModerateEvents {
    pub fn new(container: Container) -> Self {
        Self {
            container,
            log: Arc::new(Mutex::new(EventLog::default())),
            binding: None,
            actions: Actions::new(),
        }
    }

    /// Moderate the process-wide container
    pub fn global() -> Self {
        Self::new(Container::global().clone())
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Whether the recording dispatcher is currently installed
    pub fn is_active(&self) -> bool {
        self.binding.is_some()
    }

    /// Install the recording dispatcher, remembering the original binding.
    ///
    /// Does nothing if already active.
    pub fn deactivate_events(&mut self) {
        if self.binding.is_some() {
            return;
        }

        let snapshot = self.container.snapshot(EVENTS);
        debug!(
            resolved = snapshot.was_resolved(),
            bound = snapshot.binding().is_some(),
            "deactivating events"
        );
        let recorder = RecordingDispatcher::with_log(Arc::clone(&self.log));
        self.container.set_events(Arc::new(recorder));
        self.binding = Some(snapshot);
    }

    /// Put the original binding back; with `reset`, drop the recordings.
    ///
    /// Does nothing if not active.
    pub fn reactivate_events(&mut self, reset: bool) {
        let Some(snapshot) = self.binding.take() else {
            return;
        };

        debug!(resolved = snapshot.was_resolved(), reset, "reactivating events");
        self.container.restore(EVENTS, snapshot);
        if reset {
            self.log.lock().clear();
        }
    }

    /// Run `probe` with events recorded instead of dispatched.
    ///
    /// The original dispatcher is restored however `probe` exits, including
    /// by panic.
    pub fn cherry_pick_events<R>(&mut self, probe: impl FnOnce() -> R, reset: bool) -> R {
        self.deactivate_events();
        let _guard = Reactivate {
            moderator: self,
            reset,
        };
        probe()
    }

    /// Replay the recorded events through the real dispatcher.
    ///
    /// Events whose identifier matches `target_event` fire with only the
    /// listeners matching `target_listener` (by glob, exact id, or `*`).
    pub fn fire_events(
        &mut self,
        target_event: &str,
        target_listener: &str,
    ) -> Result<&mut Self, EventError> {
        if self.is_active() {
            return Err(EventError::StillRecording);
        }
        let event_pattern = Pattern::new(target_event)?;
        let listener_pattern = Pattern::new(target_listener)?;
        let dispatcher = self.container.events()?;

        let (events, args) = {
            let log = self.log.lock();
            (log.events().to_vec(), log.args().to_vec())
        };

        // Resolve before detaching: a wildcard listener shared by several
        // recorded events must still reach the ones in scope.
        let mut resolved: BTreeMap<String, Vec<_>> = BTreeMap::new();
        for event in &events {
            resolved
                .entry(event.name().to_string())
                .or_insert_with_key(|name| dispatcher.listeners(name));
        }

        for (index, event) in events.into_iter().enumerate() {
            let name = event.name().to_string();
            let listeners = resolved.get(&name).cloned().unwrap_or_default();
            dispatcher.forget(&name);

            if !event_pattern.matches(&name) {
                debug!(event = %name, detached = listeners.len(), "event out of scope");
                continue;
            }

            let record = self.actions.entry(name.clone()).or_default();
            for listener in listeners {
                let id = listener.id();
                let selected = target_listener == "*"
                    || id == target_listener
                    || listener_pattern.matches(id);
                if !selected {
                    continue;
                }
                if !record.listeners.iter().any(|known| known == id) {
                    record.listeners.push(id.to_string());
                }
                dispatcher.listen(&name, listener);
            }
            debug!(event = %name, listeners = ?record.listeners, "replaying event");

            let args = args.get(index).cloned().unwrap_or_default();
            dispatcher.dispatch(event, args);
        }

        Ok(self)
    }

    /// Record what `trigger` fires, then replay the events in scope
    pub fn firing_scope(
        &mut self,
        trigger: impl FnOnce(),
        target_event: &str,
        target_listener: &str,
    ) -> Result<&Actions, EventError> {
        self.cherry_pick_events(trigger, false);
        self.fire_events(target_event, target_listener)?;
        Ok(&self.actions)
    }

    /// Events recorded so far, in firing order
    pub fn fired_events(&self) -> Vec<Event> {
        self.log.lock().events().to_vec()
    }

    /// Captured arguments, parallel to [`ModerateEvents::fired_events`]
    pub fn fired_args(&self) -> Vec<Vec<EventArg>> {
        self.log.lock().args().to_vec()
    }

    /// Event logs snapshot, including `listen` calls seen while recording
    pub fn event_log(&self) -> EventLog {
        self.log.lock().clone()
    }

    pub fn actions(&self) -> &Actions {
        &self.actions
    }

    /// Recorded event identifiers, by firing position
    pub fn to_array(&self) -> Vec<String> {
        self.log
            .lock()
            .events()
            .iter()
            .map(|event| event.name().to_string())
            .collect()
    }
}

impl Default for ModerateEvents {
    fn default() -> Self {
        Self::global()
    }
}

impl Drop for ModerateEvents {
    fn drop(&mut self) {
        self.reactivate_events(false);
    }
}

impl std::fmt::Debug for ModerateEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModerateEvents")
            .field("active", &self.is_active())
            .field("fired", &self.to_array())
            .field("actions", &self.actions)
            .finish()
    }
}

struct Reactivate<'a> {
    moderator: &'a mut ModerateEvents,
    reset: bool,
}

impl Drop for Reactivate<'_> {
    fn drop(&mut self) {
        self.moderator.reactivate_events(self.reset);
    }
}

#[cfg(test)]
#[path = "moderate_tests.rs"]
mod tests;
