// src/engine/mod.rs

//! Orchestration engine for taskdag.
//!
//! This module ties together:
//! - the task registry (what can run)
//! - the planner (what a build of a given root needs)
//! - the executor (running a plan with correct ordering)
//! - the event emitter (lifecycle notifications)
//!
//! [`Engine`] is the entry point. It is cheap to clone; clones share the same
//! registry and listeners.

pub mod events;
mod executor;

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::task::JoinHandle;
use tracing::{info, warn};

pub use events::{Event, EventEmitter, EventKind, ListenerId, TaskDescriptor};

use crate::dag::ExecutionPlan;
use crate::errors::{Result, TaskdagError};
use crate::task::{Task, TaskRegistry, TaskSpec};
use crate::types::{BuildId, TaskName};

use executor::Executor;

/// Callback form of a build's completion notification.
pub type BuildCallback = Box<dyn FnOnce(Result<()>) + Send + 'static>;

/// Engine-wide execution options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Upper bound on task bodies in flight within one build.
    ///
    /// `None` means independent tasks all start as soon as they are ready.
    pub max_concurrency: Option<NonZeroUsize>,
}

impl EngineOptions {
    /// Options capping a build at `max` bodies in flight. Zero is rejected.
    pub fn with_max_concurrency(max: usize) -> Result<Self> {
        let max = NonZeroUsize::new(max).ok_or_else(|| {
            TaskdagError::ConfigError("max_concurrency must be >= 1 (got 0)".to_string())
        })?;
        Ok(Self {
            max_concurrency: Some(max),
        })
    }
}

#[derive(Clone, Default)]
pub struct Engine {
    registry: Arc<RwLock<TaskRegistry>>,
    events: Arc<EventEmitter>,
    options: EngineOptions,
    build_counter: Arc<AtomicU64>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Register (or replace) a task. Returns the replaced definition.
    pub fn register(&self, spec: TaskSpec) -> Option<Arc<Task>> {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(spec)
    }

    /// Look up a registered task.
    pub fn task(&self, name: &str) -> Option<Arc<Task>> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Registered task names in registration order.
    pub fn task_names(&self) -> Vec<TaskName> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .names()
            .map(str::to_string)
            .collect()
    }

    /// Copy of the registry as it is right now.
    pub fn registry_snapshot(&self) -> TaskRegistry {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    /// Subscribe to an event. See [`EventEmitter::on`].
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&Event<'_>) + Send + Sync + 'static,
    {
        self.events.on(kind, listener)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    /// Resolve the execution plan `build(name)` would run, without running it.
    pub fn plan(&self, name: &str) -> Result<ExecutionPlan> {
        ExecutionPlan::build(name, &self.registry_snapshot())
    }

    /// Run `name` and its dependency closure.
    ///
    /// Resolves exactly once: `Ok(())` when the root finished, or the first
    /// error that ended the run. Errors are also published as `error` (and
    /// `task:error` when attributable to a task).
    pub async fn build(&self, name: &str) -> Result<()> {
        let build_id = BuildId(self.build_counter.fetch_add(1, Ordering::Relaxed) + 1);
        // Builds work on a snapshot; later registrations don't affect them.
        let registry = self.registry_snapshot();

        info!(task = %name, %build_id, "starting build");

        let plan = match ExecutionPlan::build(name, &registry) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(task = %name, %build_id, error = %err, "failed to resolve execution plan");
                self.events.emit(&Event::Error(&err));
                return Err(err);
            }
        };

        Executor::new(build_id, &plan, &registry, &self.events, &self.options)
            .run()
            .await
    }

    /// Build several roots one after another, stopping at the first error.
    pub async fn build_all<I, S>(&self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.build(name.as_ref()).await?;
        }
        Ok(())
    }

    /// Callback form of [`Engine::build`].
    ///
    /// Without a callback there is nowhere to deliver the result, so this
    /// fails immediately with [`TaskdagError::MissingCallback`] instead of
    /// starting anything. Otherwise the build is spawned on the current Tokio
    /// runtime and `callback` is invoked exactly once with its result.
    pub fn spawn_build(
        &self,
        name: impl Into<TaskName>,
        callback: Option<BuildCallback>,
    ) -> Result<JoinHandle<()>> {
        let Some(callback) = callback else {
            return Err(TaskdagError::MissingCallback);
        };

        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| TaskdagError::Other(anyhow::anyhow!("spawn_build needs a Tokio runtime: {e}")))?;

        let engine = self.clone();
        let name = name.into();

        Ok(handle.spawn(async move {
            let result = engine.build(&name).await;
            callback(result);
        }))
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("tasks", &self.task_names())
            .field("events", &self.events)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
