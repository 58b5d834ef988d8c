// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod task;
pub mod types;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::engine::{Engine, EventKind};

pub use crate::engine::EngineOptions;
pub use crate::errors::{TaskError, TaskdagError};
pub use crate::task::{Done, TaskSpec};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - task file loading
/// - engine construction and task registration
/// - dry-run plan printing, or building the requested roots in order
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let taskfile = load_and_validate(&config_path)?;

    let mut options = taskfile.engine_options();
    if let Some(n) = args.max_concurrency {
        options.max_concurrency = Some(n);
    }

    let engine = Engine::with_options(options);
    taskfile.register_into(&engine, &config_root_dir(&config_path));

    let roots = args.root_tasks();

    if args.dry_run {
        print_dry_run(&engine, &roots)?;
        return Ok(());
    }

    log_lifecycle(&engine);

    info!(?roots, "building tasks");
    if let Err(err) = engine.build_all(&roots).await {
        // Task failures display only the body's message; name the task here.
        return Err(match err.task().map(str::to_string) {
            Some(task) => anyhow::Error::new(err).context(format!("task '{task}' failed")),
            None => err.into(),
        });
    }
    info!("all tasks finished");
    Ok(())
}

/// Directory task `cwd` values are relative to.
///
/// - If the task file path has a non-empty parent (e.g. "ci/Taskdag.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Taskdag.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn log_lifecycle(engine: &Engine) {
    engine.on(EventKind::TaskStarting, |event| {
        if let Some(task) = event.task() {
            info!(task = %task.name, deps = ?task.deps, "starting");
        }
    });
    engine.on(EventKind::TaskFinished, |event| {
        if let Some(task) = event.task() {
            info!(task = %task.name, "finished");
        }
    });
    engine.on(EventKind::TaskError, |event| {
        if let (Some(task), Some(err)) = (event.task(), event.error()) {
            error!(task = %task.name, error = %err, "errored");
        }
    });
}

/// Dry-run output: each root's plan in dependencies-first order.
fn print_dry_run(engine: &Engine, roots: &[String]) -> Result<()> {
    println!("taskdag dry-run");
    if let Some(max) = engine.options().max_concurrency {
        println!("  engine.max_concurrency = {max}");
    }

    for root in roots {
        let plan = engine.plan(root)?;
        println!();
        println!("{root} ({} tasks):", plan.len());

        for name in plan.execution_order()? {
            let Some(node) = plan.node(name) else {
                continue;
            };
            if !node.is_registered() {
                println!("  - {name} (unregistered)");
                continue;
            }
            println!("  - {name}");
            if !node.deps().is_empty() {
                println!("      deps: {:?}", node.deps());
            }
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
