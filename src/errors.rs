// src/errors.rs

//! Crate-wide error types.
//!
//! [`TaskdagError`] is what a build reports to its caller (and to `error`
//! listeners). [`TaskError`] is the error a task body hands back through its
//! completion handle; it is kept as-is inside `TaskFailed` so callers can get
//! at the body's own message.

use std::fmt;

use thiserror::Error;

use crate::types::TaskName;

#[derive(Error, Debug)]
pub enum TaskdagError {
    #[error("task '{task}' depends on unregistered task '{dependency}'")]
    UnregisteredDependency {
        task: TaskName,
        dependency: TaskName,
    },

    #[error("task '{0}' is not registered")]
    UnregisteredTask(TaskName),

    #[error("cyclic dependency detected: {0}")]
    CyclicDependency(String),

    /// Displays as the body's own message; the task is in `task`.
    #[error("{source}")]
    TaskFailed {
        task: TaskName,
        #[source]
        source: TaskError,
    },

    #[error("invalid dependency pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("build was called without a completion callback")]
    MissingCallback,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskdagError {
    /// Name of the task this error is attributed to, if any.
    pub fn task(&self) -> Option<&str> {
        match self {
            TaskdagError::UnregisteredDependency { task, .. } => Some(task),
            TaskdagError::UnregisteredTask(task) => Some(task),
            TaskdagError::TaskFailed { task, .. } => Some(task),
            _ => None,
        }
    }

    /// The error reported by a task body, for `TaskFailed`.
    pub fn task_error(&self) -> Option<&TaskError> {
        match self {
            TaskdagError::TaskFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Error reported by a task body.
///
/// Displays exactly the message the body produced.
pub struct TaskError(anyhow::Error);

impl TaskError {
    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self(anyhow::Error::msg(message))
    }

    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }

    pub fn into_inner(self) -> anyhow::Error {
        self.0
    }
}

impl From<anyhow::Error> for TaskError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl std::error::Error for TaskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let inner: &(dyn std::error::Error + Send + Sync + 'static) = &*self.0;
        inner.source()
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskdagError>;
