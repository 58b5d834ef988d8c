// src/task/body.rs

//! The task body contract.
//!
//! A body is handed a [`Done`] handle and returns immediately. It reports the
//! outcome later (or right away) through that handle:
//!
//! - `done.ok()` → success
//! - `done.fail(err)` → failure with `err`
//!
//! Returning `Err` from [`TaskBody::run`], panicking inside it, or dropping the
//! handle without signaling are all treated as failures by the executor.

use std::future::Future;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::errors::TaskError;
use crate::types::TaskName;

/// Signal flowing from a [`Done`] handle back to the build that issued it.
#[derive(Debug)]
pub(crate) struct Completion {
    pub task: TaskName,
    pub outcome: std::result::Result<(), TaskError>,
}

/// Completion handle given to a task body.
///
/// Signaling consumes the handle, so a body can report at most once.
pub struct Done {
    task: TaskName,
    tx: Option<mpsc::UnboundedSender<Completion>>,
}

impl Done {
    pub(crate) fn new(task: TaskName, tx: mpsc::UnboundedSender<Completion>) -> Self {
        Self { task, tx: Some(tx) }
    }

    /// Name of the task this handle belongs to.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Report success.
    pub fn ok(mut self) {
        self.signal(Ok(()));
    }

    /// Report failure.
    pub fn fail<E: Into<anyhow::Error>>(mut self, err: E) {
        self.signal(Err(TaskError::from(err.into())));
    }

    /// Report whatever `result` holds.
    pub fn finish(self, result: anyhow::Result<()>) {
        match result {
            Ok(()) => self.ok(),
            Err(err) => self.fail(err),
        }
    }

    fn signal(&mut self, outcome: std::result::Result<(), TaskError>) {
        let Some(tx) = self.tx.take() else {
            return;
        };

        let completion = Completion {
            task: self.task.clone(),
            outcome,
        };

        if tx.send(completion).is_err() {
            // The build already finished (usually because another task
            // failed); late results are discarded.
            debug!(task = %self.task, "build no longer running; dropping completion signal");
        }
    }
}

impl Drop for Done {
    fn drop(&mut self) {
        if self.tx.is_some() {
            warn!(task = %self.task, "completion handle dropped without signaling");
            let message = format!(
                "task '{}' dropped its completion handle without signaling",
                self.task
            );
            self.signal(Err(TaskError::msg(message)));
        }
    }
}

impl std::fmt::Debug for Done {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Done")
            .field("task", &self.task)
            .field("signaled", &self.tx.is_none())
            .finish()
    }
}

/// A runnable unit of work.
pub trait TaskBody: Send + Sync {
    /// Start the work. Must return promptly; completion is reported via `done`.
    fn run(&self, done: Done) -> anyhow::Result<()>;
}

impl<F> TaskBody for F
where
    F: Fn(Done) -> anyhow::Result<()> + Send + Sync,
{
    fn run(&self, done: Done) -> anyhow::Result<()> {
        self(done)
    }
}

/// Adapts an async closure into a [`TaskBody`].
///
/// Each run builds a fresh future and spawns it on the current Tokio runtime;
/// its output is reported through the completion handle.
pub struct FutureBody<F> {
    make: F,
}

impl<F, Fut> FutureBody<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    pub fn new(make: F) -> Self {
        Self { make }
    }
}

impl<F, Fut> TaskBody for FutureBody<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn run(&self, done: Done) -> anyhow::Result<()> {
        let fut = (self.make)();
        tokio::spawn(async move {
            done.finish(fut.await);
        });
        Ok(())
    }
}
