// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Event dispatch and scoped event firing.
//!
//! ```no_run
//! use test_helper::container::Container;
//! use test_helper::events::{dispatch, ModerateEvents};
//!
//! let container = Container::with_events();
//! let mut moderator = ModerateEvents::new(container.clone());
//! let actions = moderator
//!     .firing_scope(
//!         || {
//!             let _ = dispatch(&container, "orders.created", Vec::new());
//!         },
//!         "orders.*",
//!         "*",
//!     )
//!     .unwrap();
//! assert!(actions.contains_key("orders.created"));
//! ```

mod dispatcher;
mod event;
mod moderate;
mod recorder;

pub use dispatcher::{Dispatcher, EventDispatcher, Listener, ListenerFn};
pub use event::{Event, EventArg, SharedObject};
pub use moderate::{ActionRecord, Actions, ModerateEvents};
pub use recorder::{EventLog, RecordingDispatcher, Registration};

use crate::container::{Container, ContainerError};
use serde_json::Value;
use thiserror::Error;

/// Errors from scoped event firing
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Event dispatcher unavailable: {0}")]
    Container(#[from] ContainerError),

    #[error("Events are still being recorded; reactivate them before replaying")]
    StillRecording,
}

/// Fire `event` through the container's current dispatcher
pub fn dispatch(
    container: &Container,
    event: impl Into<Event>,
    args: Vec<EventArg>,
) -> Result<Vec<Value>, ContainerError> {
    Ok(container.events()?.dispatch(event.into(), args))
}
