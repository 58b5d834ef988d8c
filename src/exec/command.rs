// src/exec/command.rs

//! Shell command task body.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::task::{Done, TaskBody};

/// Runs a shell command; exit status 0 is success.
#[derive(Debug, Clone)]
pub struct CommandBody {
    cmd: String,
    cwd: Option<PathBuf>,
}

impl CommandBody {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            cwd: None,
        }
    }

    /// Run the command from `dir` instead of the process working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }
}

impl TaskBody for CommandBody {
    fn run(&self, done: Done) -> Result<()> {
        let task = done.task().to_string();
        let cmd = self.cmd.clone();
        let cwd = self.cwd.clone();

        tokio::spawn(async move {
            let result = run_command(&task, &cmd, cwd.as_deref()).await;
            done.finish(result);
        });

        Ok(())
    }
}

/// Run `cmd` through the platform shell, logging its output.
pub async fn run_command(task: &str, cmd: &str, cwd: Option<&Path>) -> Result<()> {
    info!(task = %task, cmd = %cmd, "starting task process");

    // Build a shell command appropriate for the platform.
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for task '{task}'"))?;

    // Always consume both pipes so buffers don't fill.
    if let Some(stdout) = child.stdout.take() {
        let task_name = task.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(task = %task_name, "{}", line);
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        let task_name = task.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_name, "stderr: {}", line);
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of task '{task}'"))?;

    let code = status.code().unwrap_or(-1);
    info!(
        task = %task,
        exit_code = code,
        success = status.success(),
        "task process exited"
    );

    if !status.success() {
        bail!("command `{cmd}` exited with status {code}");
    }
    Ok(())
}
