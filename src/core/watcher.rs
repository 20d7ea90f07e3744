use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::Result;

use crate::{
    config::ReminderConfig,
    core::state::NotificationSlot,
    exec::{CommandResult, CommandRunner, ShellRunner},
    log::Logger,
    notifications::{Host, terminal::TerminalHost},
};

/// Absolute path of the watched working directory, fixed for the process
/// lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceTarget(PathBuf);

impl WorkspaceTarget {
    pub fn new(path: &Path) -> Result<Self> {
        let abs = path
            .canonicalize()
            .map_err(|e| anyhow::anyhow!("Cannot resolve workspace {}: {e}", path.display()))?;
        if !abs.is_dir() {
            anyhow::bail!("Workspace {} is not a directory", abs.display());
        }
        Ok(Self(abs))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Everything a scan needs, shared by the scanner, the dispatcher and the
/// process loop.
pub struct WatchContext {
    pub target: WorkspaceTarget,
    pub config: ReminderConfig,
    pub runner: Arc<dyn CommandRunner>,
    pub host: Arc<dyn Host>,
    pub logger: Logger,
    notification: Mutex<NotificationSlot>,
}

impl WatchContext {
    pub async fn git(&self, command: &str) -> CommandResult {
        self.runner.run(command, self.target.path()).await
    }

    /// Shows `text` as the new status line, disposing the previous one.
    pub fn show_status(&self, text: &str) {
        let mut slot = self
            .notification
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        slot.replace(|| self.host.set_status(text));
    }

    pub fn dispose_notification(&self) {
        self.notification
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .dispose();
    }

    pub fn has_notification(&self) -> bool {
        self.notification
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_live()
    }
}

pub struct WatchContextBuilder {
    target: PathBuf,
    config: ReminderConfig,
    runner: Option<Arc<dyn CommandRunner>>,
    host: Option<Arc<dyn Host>>,
    logger: Option<Logger>,
}

impl WatchContextBuilder {
    pub fn new(target: impl Into<PathBuf>, config: ReminderConfig) -> Self {
        Self {
            target: target.into(),
            config,
            runner: None,
            host: None,
            logger: None,
        }
    }

    pub fn runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn host(mut self, host: Arc<dyn Host>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub async fn build(self) -> Result<WatchContext> {
        let target = WorkspaceTarget::new(&self.target)?;

        let logger = match (self.logger, &self.config.log_file) {
            (Some(logger), _) => logger,
            (None, Some(path)) => Logger::new(path).await?,
            (None, None) => Logger::stderr(),
        };
        let runner = self
            .runner
            .unwrap_or_else(|| Arc::new(ShellRunner::new(logger.clone())));
        let host = self
            .host
            .unwrap_or_else(|| Arc::new(TerminalHost::new()));

        Ok(WatchContext {
            target,
            config: self.config,
            runner,
            host,
            logger,
            notification: Mutex::new(NotificationSlot::new()),
        })
    }
}
