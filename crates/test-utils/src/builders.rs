#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use taskdag::config::{EngineSection, RawTaskfile, TaskConfig, Taskfile};

/// Builder for `Taskfile` to simplify test setup.
pub struct TaskfileBuilder {
    raw: RawTaskfile,
}

impl TaskfileBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawTaskfile {
                engine: EngineSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.raw.task.insert(name.to_string(), task);
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.raw.engine.max_concurrency = Some(max);
        self
    }

    /// The unvalidated task file, for exercising validation failures.
    pub fn raw(self) -> RawTaskfile {
        self.raw
    }

    pub fn build(self) -> Taskfile {
        Taskfile::try_from(self.raw).expect("Failed to build valid task file from builder")
    }
}

impl Default for TaskfileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    /// A grouping task (no command).
    pub fn group() -> Self {
        Self {
            task: TaskConfig::default(),
        }
    }

    pub fn new(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: Some(cmd.to_string()),
                deps: vec![],
                cwd: None,
            },
        }
    }

    pub fn dep(mut self, dep: &str) -> Self {
        self.task.deps.push(dep.to_string());
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.task.cwd = Some(dir.into());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
