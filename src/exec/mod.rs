// src/exec/mod.rs

//! Process execution layer.
//!
//! Task bodies are opaque to the engine; this module provides the one
//! concrete body taskdag ships: [`CommandBody`], which runs a shell command
//! with `tokio::process::Command`. Task files use it for every `cmd = "..."`.

pub mod command;

pub use command::{run_command, CommandBody};
