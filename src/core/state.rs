use std::fmt;

use serde::{Deserialize, Serialize};

use crate::notifications::StatusHandle;

/// Why a scan ran. Diagnostics only, never branched on.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTrigger {
    Initial,
    MetadataChange,
    PostPushRescan,
}

impl fmt::Display for ScanTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ScanTrigger::Initial => "initial",
            ScanTrigger::MetadataChange => "metadata change",
            ScanTrigger::PostPushRescan => "pushed branch",
        };
        f.write_str(tag)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Idle,
    Syncing,
    Classifying,
    Counting,
    Reporting,
}

/// What a finished scan told the user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ScanReport {
    Synced { branch: String },
    Unpushed { branch: String, count: usize },
    NoUpstream { branch: String },
    Detached,
}

/// Owner of the single live status line.
///
/// Every writer goes through [`NotificationSlot::replace`], which disposes
/// the previous handle before storing the new one, so a handle is never
/// dropped without being disposed.
#[derive(Default)]
pub struct NotificationSlot {
    current: Option<Box<dyn StatusHandle>>,
}

impl NotificationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disposes the current handle, then draws the next one with `show`.
    pub fn replace(&mut self, show: impl FnOnce() -> Box<dyn StatusHandle>) {
        self.dispose();
        self.current = Some(show());
    }

    pub fn dispose(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.dispose();
        }
    }

    pub fn is_live(&self) -> bool {
        self.current.is_some()
    }
}

impl fmt::Debug for NotificationSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationSlot")
            .field("live", &self.is_live())
            .finish()
    }
}
