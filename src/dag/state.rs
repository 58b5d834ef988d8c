// src/dag/state.rs

//! Per-build run state.
//!
//! One [`RunState`] exists per build invocation and is owned by the executor
//! servicing it. It never touches the registry; everything it needs about the
//! graph comes from the [`ExecutionPlan`].

use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;

use tracing::debug;

use crate::dag::ExecutionPlan;
use crate::types::{BuildId, TaskName};

/// State of a task within one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Part of the plan, not yet reached by activation.
    Pending,
    /// Activated (`task:starting` emitted), waiting on dependencies.
    Waiting,
    /// All dependencies finished; queued to start.
    Ready,
    /// Body invoked, waiting for its completion signal.
    Running,
    Finished,
    Errored,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Finished | TaskState::Errored)
    }
}

/// Mutable bookkeeping for a single build.
#[derive(Debug)]
pub struct RunState {
    build_id: BuildId,
    root: TaskName,
    states: HashMap<TaskName, TaskState>,
    /// Ready tasks, first-ready first-started.
    ready: VecDeque<TaskName>,
    /// Tasks in the order they finished.
    completed: Vec<TaskName>,
    /// Task whose failure ended the run.
    failed: Option<TaskName>,
    running: usize,
}

impl RunState {
    pub fn new(build_id: BuildId, plan: &ExecutionPlan) -> Self {
        let states = plan
            .names()
            .map(|name| (name.to_string(), TaskState::Pending))
            .collect();

        Self {
            build_id,
            root: plan.root().to_string(),
            states,
            ready: VecDeque::new(),
            completed: Vec::new(),
            failed: None,
            running: 0,
        }
    }

    pub fn build_id(&self) -> BuildId {
        self.build_id
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn state_of(&self, task: &str) -> Option<TaskState> {
        self.states.get(task).copied()
    }

    pub fn running_count(&self) -> usize {
        self.running
    }

    pub fn has_ready(&self) -> bool {
        !self.ready.is_empty()
    }

    pub fn completed(&self) -> &[TaskName] {
        &self.completed
    }

    pub fn failed_task(&self) -> Option<&str> {
        self.failed.as_deref()
    }

    pub fn root_finished(&self) -> bool {
        self.state_of(&self.root) == Some(TaskState::Finished)
    }

    /// Whether the run reached either terminal condition.
    pub fn is_over(&self) -> bool {
        self.failed.is_some() || self.root_finished()
    }

    /// Move a `Pending` task to `Waiting`, queueing it if it has nothing to
    /// wait for.
    pub fn activate(&mut self, plan: &ExecutionPlan, task: &str) {
        if self.state_of(task) != Some(TaskState::Pending) {
            return;
        }
        self.set(task, TaskState::Waiting);
        self.enqueue_if_ready(plan, task);
    }

    /// Whether every dependency of `task` has finished in this run.
    pub fn deps_finished(&self, plan: &ExecutionPlan, task: &str) -> bool {
        plan.dependencies_of(task)
            .iter()
            .all(|dep| self.state_of(dep) == Some(TaskState::Finished))
    }

    /// Pop the next ready task and mark it `Running`.
    ///
    /// Returns `None` when nothing is ready, the run is over, or
    /// `max_running` tasks are already in flight.
    pub fn next_ready(&mut self, max_running: Option<NonZeroUsize>) -> Option<TaskName> {
        if self.is_over() {
            return None;
        }
        if let Some(max) = max_running {
            if self.running >= max.get() {
                return None;
            }
        }

        let task = self.ready.pop_front()?;
        self.set(&task, TaskState::Running);
        self.running += 1;
        Some(task)
    }

    /// Record success of a running task and queue dependents that became
    /// ready. Returns `false` (and changes nothing) if the task was not
    /// running.
    pub fn mark_finished(&mut self, plan: &ExecutionPlan, task: &str) -> bool {
        if self.state_of(task) != Some(TaskState::Running) {
            return false;
        }

        self.set(task, TaskState::Finished);
        self.running -= 1;
        self.completed.push(task.to_string());

        for dependent in plan.dependents_of(task) {
            self.enqueue_if_ready(plan, dependent);
        }
        true
    }

    /// Record that `task` failed and end the run. Returns `false` if the run
    /// was already over.
    pub fn mark_errored(&mut self, task: &str) -> bool {
        if self.is_over() {
            return false;
        }

        if self.state_of(task) == Some(TaskState::Running) {
            self.running -= 1;
        }
        self.set(task, TaskState::Errored);
        self.failed = Some(task.to_string());
        self.ready.clear();
        true
    }

    fn enqueue_if_ready(&mut self, plan: &ExecutionPlan, task: &str) {
        if self.state_of(task) == Some(TaskState::Waiting) && self.deps_finished(plan, task) {
            self.set(task, TaskState::Ready);
            self.ready.push_back(task.to_string());
            debug!(task = %task, build_id = %self.build_id, "dependencies satisfied; task ready");
        }
    }

    fn set(&mut self, task: &str, state: TaskState) {
        if let Some(slot) = self.states.get_mut(task) {
            *slot = state;
        }
    }
}
