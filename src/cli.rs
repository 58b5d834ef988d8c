// src/cli.rs

//! CLI argument parsing using `clap`.

use std::num::NonZeroUsize;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `taskdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskdag",
    version,
    about = "Run tasks and their dependencies from a task file.",
    long_about = None
)]
pub struct CliArgs {
    /// Tasks to build, in order. Defaults to `default`.
    #[arg(value_name = "TASK")]
    pub tasks: Vec<String>,

    /// Path to the task file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Taskdag.toml")]
    pub config: String,

    /// Maximum number of tasks running at once (overrides `[engine]`).
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<NonZeroUsize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print each task's execution plan without running anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Tasks to build, falling back to `default`.
    pub fn root_tasks(&self) -> Vec<String> {
        if self.tasks.is_empty() {
            vec!["default".to_string()]
        } else {
            self.tasks.clone()
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
