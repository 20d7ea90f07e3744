pub mod parser;

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 6;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_PUSH_PROMPT_THRESHOLD: usize = 2;
pub const DEFAULT_STATUS_PREFIX: &str = "[GitReminder]";

fn default_remote() -> String {
    DEFAULT_REMOTE.to_string()
}

fn default_sync_timeout_secs() -> u64 {
    DEFAULT_SYNC_TIMEOUT_SECS
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_push_prompt_threshold() -> usize {
    DEFAULT_PUSH_PROMPT_THRESHOLD
}

fn default_status_prefix() -> String {
    DEFAULT_STATUS_PREFIX.to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReminderConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_sync_timeout_secs")]
    pub sync_timeout_secs: u64,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Unpushed count from which the push prompt is offered. Below it only
    /// the status line is updated.
    #[serde(default = "default_push_prompt_threshold")]
    pub push_prompt_threshold: usize,

    #[serde(default = "default_status_prefix")]
    pub status_prefix: String,

    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            sync_timeout_secs: default_sync_timeout_secs(),
            debounce_ms: default_debounce_ms(),
            push_prompt_threshold: default_push_prompt_threshold(),
            status_prefix: default_status_prefix(),
            log_file: None,
        }
    }
}

impl ReminderConfig {
    pub fn sync_timeout(&self) -> Duration {
        Duration::from_secs(self.sync_timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
