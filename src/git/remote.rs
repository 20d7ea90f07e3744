use std::sync::Arc;

use crate::{
    core::watcher::WatchContext,
    exec::{CommandResult, run_with_soft_timeout},
};

pub const STATUS_CMD: &str = "git status";
pub const REMOTE_LIST_CMD: &str = "git remote -v";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSyncOutcome {
    Updated,
    TimedOut,
    Failed(String),
}

impl From<&CommandResult> for RemoteSyncOutcome {
    fn from(res: &CommandResult) -> Self {
        match res {
            Ok(_) => RemoteSyncOutcome::Updated,
            Err(e) if e.is_timeout() => RemoteSyncOutcome::TimedOut,
            Err(e) => RemoteSyncOutcome::Failed(e.to_string()),
        }
    }
}

impl RemoteSyncOutcome {
    pub fn message(&self) -> String {
        match self {
            RemoteSyncOutcome::Updated => "Updated".to_string(),
            RemoteSyncOutcome::TimedOut => "Sync timed out".to_string(),
            RemoteSyncOutcome::Failed(reason) => format!("Sync failed: {reason}"),
        }
    }
}

/// Outcome of the one-off check that runs before watching starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteState {
    Ready,
    NoRepo,
    FetchError(String),
}

pub fn update_cmd(remote: &str) -> String {
    format!("git remote update {remote} --prune")
}

pub fn push_cmd(remote: &str, branch: &str, set_upstream: bool) -> String {
    let branch = shell_words::quote(branch);
    if set_upstream {
        format!("git push -u {remote} {branch}")
    } else {
        format!("git push {remote} {branch}")
    }
}

/// Prunes and updates the configured remote, raced against the configured
/// deadline. A late completion after the deadline is dropped.
pub async fn sync_remote(ctx: &WatchContext) -> CommandResult {
    run_with_soft_timeout(
        Arc::clone(&ctx.runner),
        update_cmd(&ctx.config.remote),
        ctx.target.path().to_path_buf(),
        ctx.config.sync_timeout(),
    )
    .await
}

pub async fn check_remote(ctx: &WatchContext) -> RemoteState {
    let mut progress = ctx.host.begin_progress("Checking remote");
    progress.report("Looking for repository...", 10);

    let state = async {
        if ctx.git(STATUS_CMD).await.is_err() {
            return RemoteState::NoRepo;
        }
        match ctx.git(REMOTE_LIST_CMD).await {
            Ok(remotes) if !remotes.is_empty() => {}
            _ => return RemoteState::NoRepo,
        }
        match sync_remote(ctx).await {
            Ok(_) => RemoteState::Ready,
            Err(e) => RemoteState::FetchError(e.to_string()),
        }
    }
    .await;

    progress.report("Done", 100);
    progress.end();
    state
}

/// Fire-and-forget from the caller's point of view: the result is only
/// logged. Whether it worked shows up in the next scan.
pub async fn push_branch(ctx: &WatchContext, branch: &str, set_upstream: bool) -> CommandResult {
    ctx.git(&push_cmd(&ctx.config.remote, branch, set_upstream))
        .await
}
