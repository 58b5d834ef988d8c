// src/engine/executor.rs

//! Drives one build: activates the plan, starts ready tasks, waits on their
//! completion signals, and reports the terminal result once.
//!
//! Everything happens on the build's own future. Task bodies return right
//! away and signal later through their [`Done`] handle, which feeds an
//! unbounded channel this loop awaits on.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dag::{ExecutionPlan, RunState, TaskState};
use crate::engine::events::{Event, EventEmitter, TaskDescriptor};
use crate::engine::EngineOptions;
use crate::errors::{Result, TaskError, TaskdagError};
use crate::task::body::Completion;
use crate::task::{Done, TaskRegistry};
use crate::types::BuildId;

pub(crate) struct Executor<'a> {
    plan: &'a ExecutionPlan,
    registry: &'a TaskRegistry,
    events: &'a EventEmitter,
    options: &'a EngineOptions,
    state: RunState,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl<'a> Executor<'a> {
    pub(crate) fn new(
        build_id: BuildId,
        plan: &'a ExecutionPlan,
        registry: &'a TaskRegistry,
        events: &'a EventEmitter,
        options: &'a EngineOptions,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            plan,
            registry,
            events,
            options,
            state: RunState::new(build_id, plan),
            tx,
            rx,
        }
    }

    /// Run the plan to completion.
    pub(crate) async fn run(mut self) -> Result<()> {
        self.activate()?;

        loop {
            self.start_ready()?;

            if self.state.root_finished() {
                info!(
                    task = %self.plan.root(),
                    build_id = %self.state.build_id(),
                    completed = self.state.completed().len(),
                    "build finished"
                );
                return Ok(());
            }

            if self.state.running_count() == 0 {
                // Nothing in flight and nothing startable: only possible if
                // the plan and the registry disagree.
                let err = TaskdagError::Other(anyhow::anyhow!(
                    "build of '{}' stalled with no runnable tasks",
                    self.plan.root()
                ));
                return Err(self.fail(None, err));
            }

            let Some(completion) = self.rx.recv().await else {
                // We hold a sender ourselves, so the channel cannot close.
                continue;
            };
            self.handle_completion(completion)?;
        }
    }

    /// Emit `task:starting` for every task in the closure, in discovery order.
    fn activate(&mut self) -> Result<()> {
        let plan = self.plan;

        for node in plan.nodes() {
            if !node.is_registered() {
                let err = match node.parent() {
                    Some(parent) => TaskdagError::UnregisteredDependency {
                        task: parent.to_string(),
                        dependency: node.name().to_string(),
                    },
                    None => TaskdagError::UnregisteredTask(node.name().to_string()),
                };
                if let Some(parent) = node.parent() {
                    self.state.mark_errored(parent);
                }
                return Err(self.fail(node.parent(), err));
            }

            self.state.activate(plan, node.name());
            let descriptor = self.descriptor(node.name());
            debug!(task = %node.name(), build_id = %descriptor.build_id, "task starting");
            self.events.emit(&Event::TaskStarting(&descriptor));
        }

        Ok(())
    }

    /// Start every task that is ready, honouring `max_concurrency`.
    ///
    /// Grouping tasks finish inline, which may make more tasks ready; the
    /// loop keeps going until nothing more can start right now.
    fn start_ready(&mut self) -> Result<()> {
        let registry = self.registry;

        while let Some(name) = self.state.next_ready(self.options.max_concurrency) {
            let Some(task) = registry.get(&name) else {
                let err = TaskdagError::UnregisteredTask(name.clone());
                self.state.mark_errored(&name);
                return Err(self.fail(Some(&name), err));
            };

            let Some(body) = task.body() else {
                debug!(task = %name, "grouping task; finishing immediately");
                self.finish(&name);
                continue;
            };

            info!(task = %name, build_id = %self.state.build_id(), "running task");

            let done = Done::new(name.clone(), self.tx.clone());
            let outcome = catch_unwind(AssertUnwindSafe(|| body.run(done)));

            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(TaskError::from(err)),
                Err(payload) => Some(TaskError::msg(panic_message(payload.as_ref()))),
            };

            if let Some(err) = failure {
                return Err(self.task_failed(&name, err));
            }
        }

        Ok(())
    }

    fn handle_completion(&mut self, completion: Completion) -> Result<()> {
        let Completion { task, outcome } = completion;

        if self.state.state_of(&task) != Some(TaskState::Running) {
            debug!(task = %task, "ignoring completion for task that is not running");
            return Ok(());
        }

        match outcome {
            Ok(()) => {
                self.finish(&task);
                Ok(())
            }
            Err(err) => Err(self.task_failed(&task, err)),
        }
    }

    fn finish(&mut self, task: &str) {
        if self.state.mark_finished(self.plan, task) {
            let descriptor = self.descriptor(task);
            info!(task = %task, build_id = %descriptor.build_id, "task finished");
            self.events.emit(&Event::TaskFinished(&descriptor));
        }
    }

    fn task_failed(&mut self, task: &str, source: TaskError) -> TaskdagError {
        self.state.mark_errored(task);
        let err = TaskdagError::TaskFailed {
            task: task.to_string(),
            source,
        };
        self.fail(Some(task), err)
    }

    /// Broadcast a terminal error and hand it back for returning.
    fn fail(&self, task: Option<&str>, err: TaskdagError) -> TaskdagError {
        warn!(
            task = ?task,
            build_id = %self.state.build_id(),
            error = %err,
            "build failed"
        );

        if let Some(task) = task {
            let descriptor = self.descriptor(task);
            self.events.emit(&Event::TaskError {
                error: &err,
                task: &descriptor,
            });
        }
        self.events.emit(&Event::Error(&err));
        err
    }

    fn descriptor(&self, task: &str) -> TaskDescriptor {
        TaskDescriptor {
            name: task.to_string(),
            deps: self.plan.dependencies_of(task).to_vec(),
            build_id: self.state.build_id(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task body panicked".to_string()
    }
}
