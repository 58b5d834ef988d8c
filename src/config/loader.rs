// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{RawTaskfile, Taskfile};
use crate::errors::Result;

/// Load a task file from a given path and return the raw `RawTaskfile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawTaskfile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let taskfile: RawTaskfile = toml::from_str(&contents)?;

    Ok(taskfile)
}

/// Load a task file from path and validate it.
///
/// Checks for:
/// - at least one task,
/// - a sane `[engine]` section,
/// - malformed glob dependencies and exact self-dependencies,
/// - cycles among exact-name dependencies.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Taskfile> {
    let raw = load_from_path(&path)?;
    let taskfile = Taskfile::try_from(raw)?;
    Ok(taskfile)
}

/// `Taskdag.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Taskdag.toml")
}
