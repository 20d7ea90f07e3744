use std::{
    path::{Path, PathBuf},
    process::Stdio,
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::{process::Command, time::sleep};

use crate::log::Logger;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("empty command")]
    EmptyCommand,

    #[error("failed to parse `{command}`: {source}")]
    Parse {
        command: String,
        #[source]
        source: shell_words::ParseError,
    },

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with code {code:?}: {stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("timeout")]
    Timeout,
}

impl CommandError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CommandError::Timeout)
    }
}

/// Trimmed stdout on success. Never retried at this layer.
pub type CommandResult = Result<String, CommandError>;

/// The only place the crate talks to the external `git` client.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str, cwd: &Path) -> CommandResult;
}

/// Runs commands directly (no shell), split with `shell-words`.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    logger: Logger,
}

impl ShellRunner {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    async fn exec(command: &str, cwd: &Path) -> CommandResult {
        let parts = shell_words::split(command).map_err(|source| CommandError::Parse {
            command: command.to_string(),
            source,
        })?;
        let (program, args) = parts.split_first().ok_or(CommandError::EmptyCommand)?;

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                command: command.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str, cwd: &Path) -> CommandResult {
        let res = ShellRunner::exec(command, cwd).await;
        if let Err(e) = &res {
            let _ = self
                .logger
                .error(&format!("{e}\ncommand: {command}"))
                .await;
        }
        res
    }
}

/// Races `command` against `deadline`.
///
/// The command runs on its own task. When the deadline wins, that task is
/// detached, not aborted: the process keeps running and its eventual result
/// is dropped. Callers get `CommandError::Timeout` instead.
pub async fn run_with_soft_timeout(
    runner: Arc<dyn CommandRunner>,
    command: String,
    cwd: PathBuf,
    deadline: Duration,
) -> CommandResult {
    let mut task = tokio::spawn(async move { runner.run(&command, &cwd).await });

    tokio::select! {
        joined = &mut task => match joined {
            Ok(res) => res,
            Err(e) => Err(CommandError::Spawn {
                command: "<runner task>".to_string(),
                source: std::io::Error::other(e.to_string()),
            }),
        },
        _ = sleep(deadline) => Err(CommandError::Timeout),
    }
}
