use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::watcher::WatchContext;

pub const UPSTREAM_CHECK_CMD: &str = "git log @{u}..HEAD";
pub const UNPUSHED_LOG_CMD: &str = "git log @{u}..HEAD --oneline";
pub const CURRENT_BRANCH_CMD: &str = "git branch --show-current";
pub const TOPLEVEL_CMD: &str = "git rev-parse --show-toplevel";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchState {
    Tracked,
    NoUpstream,
    Detached,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub state: BranchState,
    pub branch: String, // empty only when detached
}

impl BranchInfo {
    /// Combines the two check outcomes. A missing branch name always wins:
    /// without a name the upstream check result is meaningless.
    pub fn from_checks(has_upstream: bool, branch: Option<String>) -> Self {
        match branch.filter(|b| !b.is_empty()) {
            None => BranchInfo {
                state: BranchState::Detached,
                branch: String::new(),
            },
            Some(branch) if !has_upstream => BranchInfo {
                state: BranchState::NoUpstream,
                branch,
            },
            Some(branch) => BranchInfo {
                state: BranchState::Tracked,
                branch,
            },
        }
    }
}

/// Recomputed on every scan, never cached.
pub async fn classify(ctx: &WatchContext) -> BranchInfo {
    // output is irrelevant, only whether `@{u}` resolves
    let has_upstream = ctx.git(UPSTREAM_CHECK_CMD).await.is_ok();
    let branch = ctx.git(CURRENT_BRANCH_CMD).await.ok();
    BranchInfo::from_checks(has_upstream, branch)
}

/// Commits reachable from HEAD but not from the upstream.
///
/// A failing query counts as zero: this only runs once an upstream is known
/// to exist, and a transient error must not hide the "fully synced" path.
pub async fn count_unpushed(ctx: &WatchContext) -> usize {
    match ctx.git(UNPUSHED_LOG_CMD).await {
        Ok(out) => out.lines().filter(|l| !l.trim().is_empty()).count(),
        Err(_) => 0,
    }
}

/// Metadata directory of the workspace repository. Falls back to
/// `<workspace>/.git` when the toplevel cannot be resolved.
pub async fn find_git_dir(ctx: &WatchContext) -> PathBuf {
    let root = match ctx.git(TOPLEVEL_CMD).await {
        Ok(top) if !top.is_empty() => PathBuf::from(top),
        _ => ctx.target.path().to_path_buf(),
    };
    root.join(".git")
}
