// src/dag/mod.rs

//! Dependency resolution and per-build graph state.
//!
//! - [`resolver`] expands exact names and glob patterns into task names.
//! - [`plan`] builds the glob-resolved dependency closure of a root task.
//! - [`state`] is the per-build state machine the executor drives.

pub mod plan;
pub mod resolver;
pub mod state;

pub use plan::{ExecutionPlan, PlanNode};
pub use resolver::{is_glob, resolve_dependencies, resolve_specifier, NameResolver};
pub use state::{RunState, TaskState};
