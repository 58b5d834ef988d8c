// src/types.rs

//! Small shared types used across the registry, planner and executor.

use std::fmt;

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Identifier of a single build invocation.
///
/// Monotonically increasing per [`crate::engine::Engine`]; every event
/// emitted during a build carries the id of that build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildId(pub u64);

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
