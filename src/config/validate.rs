// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::warn;

use crate::config::model::{RawTaskfile, Taskfile};
use crate::dag::resolver::{compile_pattern, is_glob};
use crate::errors::{Result, TaskdagError};

impl TryFrom<RawTaskfile> for Taskfile {
    type Error = crate::errors::TaskdagError;

    fn try_from(raw: RawTaskfile) -> std::result::Result<Self, Self::Error> {
        validate_raw_taskfile(&raw)?;
        Ok(Taskfile::new_unchecked(raw.engine, raw.task))
    }
}

fn validate_raw_taskfile(cfg: &RawTaskfile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_engine_section(cfg)?;
    validate_task_dependencies(cfg)?;
    validate_exact_cycles(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawTaskfile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(TaskdagError::ConfigError(
            "task file must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_engine_section(cfg: &RawTaskfile) -> Result<()> {
    if cfg.engine.max_concurrency == Some(0) {
        return Err(TaskdagError::ConfigError(
            "[engine].max_concurrency must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_dependencies(cfg: &RawTaskfile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.deps.iter() {
            if is_glob(dep) {
                compile_pattern(dep)?;
                continue;
            }
            if dep == name {
                return Err(TaskdagError::ConfigError(format!(
                    "task '{}' cannot depend on itself in `deps`",
                    name
                )));
            }
            if !cfg.task.contains_key(dep) {
                // Not fatal: builds that reach it report it, builds that
                // don't are unaffected.
                warn!(task = %name, dep = %dep, "task depends on a task not defined in this file");
            }
        }
    }
    Ok(())
}

/// Reject cycles among exact-name dependencies up front.
///
/// Cycles introduced through glob patterns are still caught when a build
/// resolves its plan.
fn validate_exact_cycles(cfg: &RawTaskfile) -> Result<()> {
    // Edge direction: dep -> task.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in cfg.task.iter() {
        for dep in task.deps.iter() {
            if !is_glob(dep) && cfg.task.contains_key(dep) {
                graph.add_edge(dep.as_str(), name.as_str(), ());
            }
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(TaskdagError::CyclicDependency(format!(
            "cycle detected in task file involving task '{}'",
            cycle.node_id()
        ))),
    }
}
