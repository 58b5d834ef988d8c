// src/engine/events.rs

//! Lifecycle notifications.
//!
//! Every [`super::Engine`] owns one [`EventEmitter`]. Builds publish to it
//! synchronously: `emit` returns only after every matching listener ran, in
//! subscription order.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::errors::TaskdagError;
use crate::types::{BuildId, TaskName};

/// Names of the events an engine publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `task:starting`
    TaskStarting,
    /// `task:finished`
    TaskFinished,
    /// `task:error`
    TaskError,
    /// `error`: fires for every build error, alongside `task:error`.
    Error,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::TaskStarting,
        EventKind::TaskFinished,
        EventKind::TaskError,
        EventKind::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::TaskStarting => "task:starting",
            EventKind::TaskFinished => "task:finished",
            EventKind::TaskError => "task:error",
            EventKind::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "task:starting" => Ok(EventKind::TaskStarting),
            "task:finished" => Ok(EventKind::TaskFinished),
            "task:error" => Ok(EventKind::TaskError),
            "error" => Ok(EventKind::Error),
            other => Err(format!(
                "unknown event name: {other} (expected task:starting, task:finished, task:error or error)"
            )),
        }
    }
}

/// What listeners learn about a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub name: TaskName,
    /// Concrete (glob-expanded) direct dependencies.
    pub deps: Vec<TaskName>,
    pub build_id: BuildId,
}

/// A published event.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    TaskStarting(&'a TaskDescriptor),
    TaskFinished(&'a TaskDescriptor),
    TaskError {
        error: &'a TaskdagError,
        task: &'a TaskDescriptor,
    },
    Error(&'a TaskdagError),
}

impl<'a> Event<'a> {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::TaskStarting(_) => EventKind::TaskStarting,
            Event::TaskFinished(_) => EventKind::TaskFinished,
            Event::TaskError { .. } => EventKind::TaskError,
            Event::Error(_) => EventKind::Error,
        }
    }

    pub fn task(&self) -> Option<&'a TaskDescriptor> {
        match *self {
            Event::TaskStarting(task) | Event::TaskFinished(task) => Some(task),
            Event::TaskError { task, .. } => Some(task),
            Event::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&'a TaskdagError> {
        match *self {
            Event::TaskError { error, .. } | Event::Error(error) => Some(error),
            _ => None,
        }
    }
}

/// Handle returned by [`EventEmitter::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&Event<'_>) + Send + Sync>;

struct Subscription {
    id: ListenerId,
    kind: EventKind,
    listener: Listener,
}

#[derive(Default)]
pub struct EventEmitter {
    subscriptions: RwLock<Vec<Subscription>>,
    next_id: AtomicU64,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to `kind`.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&Event<'_>) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscription {
                id,
                kind,
                listener: Arc::new(listener),
            });
        id
    }

    /// Remove a listener. Returns `false` if it was not subscribed.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut subs = self
            .subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subs.len();
        subs.retain(|s| s.id != id);
        subs.len() != before
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.kind == kind)
            .count()
    }

    /// Invoke every listener subscribed to `event.kind()`.
    ///
    /// Listeners are snapshotted first, so they may subscribe or unsubscribe
    /// from inside a callback; such changes apply from the next emit.
    pub fn emit(&self, event: &Event<'_>) {
        let kind = event.kind();
        let listeners: Vec<Listener> = self
            .subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| Arc::clone(&s.listener))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subs = self
            .subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let kinds: Vec<EventKind> = subs.iter().map(|s| s.kind).collect();
        f.debug_struct("EventEmitter")
            .field("listeners", &kinds)
            .finish()
    }
}
