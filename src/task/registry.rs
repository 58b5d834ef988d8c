// src/task/registry.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::task::{Task, TaskSpec};
use crate::types::TaskName;

/// Registered tasks keyed by name.
///
/// Enumeration order is first-registration order; re-registering a name
/// replaces the definition but keeps its position. Glob dependencies are
/// expanded in this order.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    tasks: HashMap<TaskName, Arc<Task>>,
    order: Vec<TaskName>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `spec`, replacing any task with the same name.
    ///
    /// Returns the replaced definition, if there was one. Dependencies are
    /// not checked here; unknown names only fail when a build reaches them.
    pub fn register(&mut self, spec: TaskSpec) -> Option<Arc<Task>> {
        let task = Arc::new(Task::from(spec));
        let name = task.name().to_string();

        debug!(
            task = %name,
            deps = ?task.deps(),
            has_body = task.has_body(),
            "registering task"
        );

        let previous = self.tasks.insert(name.clone(), task);
        if previous.is_none() {
            self.order.push(name);
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Task>> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Registered names in enumeration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Registered tasks in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Task>> {
        self.order.iter().filter_map(|name| self.tasks.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("tasks", &self.order)
            .finish()
    }
}
