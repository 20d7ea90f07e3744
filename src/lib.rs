//! # git-reminder
//!
//! Watches one git workspace and reminds the user when local work has
//! drifted from its remote: commits that were never pushed, or a branch
//! with no upstream at all.
//!
//! A change to `HEAD` or `refs/heads` is debounced, then a scan syncs the
//! remote (soft timeout), classifies the branch, counts unpushed commits and
//! reports through a [`notifications::Host`]. When pushing would help, the
//! user is offered a push, followed by a fresh scan.

pub mod cli;
pub mod config;
pub mod core;
pub mod exec;
pub mod git;
pub mod log;
pub mod notifications;
