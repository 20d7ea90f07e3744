//! Host boundary: how results reach the user.
//!
//! The reminder core never draws anything itself. It talks to a [`Host`]
//! that can show a disposable status line, ask a yes/no question with a
//! single action, and report progress in discrete steps. [`terminal`]
//! provides the implementation used by the binary.

use async_trait::async_trait;

use crate::core::state::ScanReport;

pub mod dispatcher;
pub mod terminal;

pub const PUSH_ACTION: &str = "push it now";

/// A status line that is visible until disposed.
pub trait StatusHandle: Send {
    fn dispose(self: Box<Self>);
}

/// A running progress indicator: begin is its creation, then increments,
/// then [`Progress::end`].
pub trait Progress: Send {
    fn report(&mut self, message: &str, increment: u8);
    fn end(self: Box<Self>);
}

#[async_trait]
pub trait Host: Send + Sync {
    fn set_status(&self, text: &str) -> Box<dyn StatusHandle>;

    /// Shows `message` with a single `action` button. `true` when the user
    /// picked the action, `false` when the prompt was dismissed.
    async fn prompt(&self, message: &str, action: &str) -> bool;

    fn begin_progress(&self, title: &str) -> Box<dyn Progress>;

    fn info(&self, message: &str);

    fn error(&self, message: &str);
}

pub fn status_text(report: &ScanReport, prefix: &str) -> String {
    match report {
        ScanReport::Synced { .. } => format!("{prefix}: 👌 All pushed, fully synced"),
        ScanReport::Unpushed { branch, count } => {
            let plural = if *count == 1 { "" } else { "s" };
            format!("{prefix}: 🧐 {count} commit{plural} to push on <{branch}>")
        }
        ScanReport::NoUpstream { branch } => format!("{prefix}: 🫢 no upstream for <{branch}>"),
        ScanReport::Detached => format!("{prefix}: 🤷 Detached head"),
    }
}

pub fn no_upstream_prompt(branch: &str, prefix: &str) -> String {
    format!("{prefix}: On branch <{branch}>, no upstream found.")
}

pub fn push_advice_prompt(count: usize, branch: &str, prefix: &str) -> String {
    format!("{prefix}: You have {count} commits to push on branch <{branch}>.")
}
