// src/task/mod.rs

//! Task definitions and the task registry.
//!
//! - [`body`] defines the [`TaskBody`] contract and the [`Done`] handle.
//! - [`registry`] stores registered tasks by name.
//!
//! Registration always goes through a normalized [`TaskSpec`]:
//!
//! ```
//! use taskdag::task::TaskSpec;
//!
//! let spec = TaskSpec::new("default")
//!     .deps(["lint", "test:*"])
//!     .body(|done| {
//!         done.ok();
//!         Ok(())
//!     });
//! assert_eq!(spec.dependency_specs(), ["lint", "test:*"]);
//! ```

pub mod body;
pub mod registry;

use std::fmt;
use std::sync::Arc;

pub use body::{Done, FutureBody, TaskBody};
pub use registry::TaskRegistry;

use crate::types::TaskName;

/// Normalized registration record: name, dependency specifiers, optional body.
#[derive(Clone)]
pub struct TaskSpec {
    name: TaskName,
    deps: Vec<String>,
    body: Option<Arc<dyn TaskBody>>,
}

impl TaskSpec {
    pub fn new(name: impl Into<TaskName>) -> Self {
        Self {
            name: name.into(),
            deps: Vec::new(),
            body: None,
        }
    }

    /// Append several dependency specifiers (exact names or globs).
    pub fn deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deps.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Append a single dependency specifier.
    pub fn dep(mut self, dep: impl Into<String>) -> Self {
        self.deps.push(dep.into());
        self
    }

    /// Use a closure as the body.
    pub fn body<F>(self, body: F) -> Self
    where
        F: Fn(Done) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.with_body(body)
    }

    /// Use any [`TaskBody`] implementation (e.g. [`FutureBody`]) as the body.
    pub fn with_body<B: TaskBody + 'static>(mut self, body: B) -> Self {
        self.body = Some(Arc::new(body));
        self
    }

    /// Use an already shared body (e.g. the same body for several tasks).
    pub fn shared_body(mut self, body: Arc<dyn TaskBody>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependency_specs(&self) -> &[String] {
        &self.deps
    }
}

impl fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSpec")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// A registered task.
pub struct Task {
    name: TaskName,
    deps: Vec<String>,
    body: Option<Arc<dyn TaskBody>>,
}

impl Task {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dependency specifiers exactly as registered (globs unexpanded).
    pub fn deps(&self) -> &[String] {
        &self.deps
    }

    pub fn body(&self) -> Option<&Arc<dyn TaskBody>> {
        self.body.as_ref()
    }

    /// Grouping tasks have no body and succeed once their deps do.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

impl From<TaskSpec> for Task {
    fn from(spec: TaskSpec) -> Self {
        Self {
            name: spec.name,
            deps: spec.deps,
            body: spec.body,
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}
