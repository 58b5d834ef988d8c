// src/config/model.rs

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::engine::{Engine, EngineOptions};
use crate::exec::CommandBody;
use crate::task::TaskSpec;

/// Task file as read from TOML, before validation.
///
/// ```toml
/// [engine]
/// max_concurrency = 4
///
/// [task.lint]
/// cmd = "cargo clippy"
///
/// [task.default]
/// deps = ["lint", "test:*"]
/// ```
///
/// All sections are optional at the serde level; validation requires at
/// least one task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTaskfile {
    /// `[engine]` section.
    #[serde(default)]
    pub engine: EngineSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// A validated task file.
///
/// Construct through `Taskfile::try_from(raw)` or
/// [`crate::config::load_and_validate`].
#[derive(Debug, Clone)]
pub struct Taskfile {
    pub engine: EngineSection,
    pub task: BTreeMap<String, TaskConfig>,
}

impl Taskfile {
    pub(crate) fn new_unchecked(engine: EngineSection, task: BTreeMap<String, TaskConfig>) -> Self {
        Self { engine, task }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions::from(&self.engine)
    }

    /// Normalized task specs. Relative `cwd` values are taken relative to
    /// `root_dir` (usually the task file's directory).
    ///
    /// Tasks are produced in name order, which is also the enumeration order
    /// glob dependencies see after registration.
    pub fn task_specs(&self, root_dir: &Path) -> Vec<TaskSpec> {
        self.task
            .iter()
            .map(|(name, cfg)| cfg.to_spec(name, root_dir))
            .collect()
    }

    /// Register every task into `engine`.
    pub fn register_into(&self, engine: &Engine, root_dir: &Path) {
        for spec in self.task_specs(root_dir) {
            engine.register(spec);
        }
    }
}

/// `[engine]` section.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct EngineSection {
    /// Maximum number of task bodies in flight per build (>= 1).
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl From<&EngineSection> for EngineOptions {
    fn from(section: &EngineSection) -> Self {
        EngineOptions {
            // Zero is rejected by validation; treat it as uncapped here.
            max_concurrency: section.max_concurrency.and_then(NonZeroUsize::new),
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskConfig {
    /// Shell command to run. Tasks without one only group their deps.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Dependency specifiers: exact task names or glob patterns.
    #[serde(default)]
    pub deps: Vec<String>,

    /// Working directory for `cmd`.
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

impl TaskConfig {
    pub fn to_spec(&self, name: &str, root_dir: &Path) -> TaskSpec {
        let spec = TaskSpec::new(name).deps(self.deps.iter().cloned());

        match &self.cmd {
            Some(cmd) => {
                let dir = match &self.cwd {
                    Some(cwd) => root_dir.join(cwd),
                    None => root_dir.to_path_buf(),
                };
                spec.with_body(CommandBody::new(cmd.clone()).current_dir(dir))
            }
            None => spec,
        }
    }
}
