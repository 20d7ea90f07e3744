#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use core_lib::{
    config::ReminderConfig,
    core::watcher::{WatchContext, WatchContextBuilder},
    exec::{CommandError, CommandResult, CommandRunner},
    git::{
        remote::update_cmd,
        repo::{CURRENT_BRANCH_CMD, UNPUSHED_LOG_CMD, UPSTREAM_CHECK_CMD},
    },
    log::Logger,
    notifications::{Host, Progress, StatusHandle},
};

#[derive(Clone)]
struct Scripted {
    result: Result<String, String>,
    delay: Option<Duration>,
}

/// Runner that answers from a script and records what was asked.
#[derive(Default)]
pub struct FakeRunner {
    script: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<String>>,
    completed: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn set(&self, command: &str, result: Result<String, String>, delay: Option<Duration>) {
        self.script
            .lock()
            .unwrap()
            .insert(command.to_string(), Scripted { result, delay });
    }

    pub fn ok(&self, command: &str, output: &str) -> &Self {
        self.set(command, Ok(output.to_string()), None);
        self
    }

    pub fn fail(&self, command: &str, stderr: &str) -> &Self {
        self.set(command, Err(stderr.to_string()), None);
        self
    }

    pub fn delayed_ok(&self, command: &str, output: &str, delay: Duration) -> &Self {
        self.set(command, Ok(output.to_string()), Some(delay));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    pub fn count(&self, command: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == command).count()
    }

    pub fn ran_prefix(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, command: &str, _cwd: &Path) -> CommandResult {
        self.calls.lock().unwrap().push(command.to_string());
        let scripted = self.script.lock().unwrap().get(command).cloned();
        let Some(scripted) = scripted else {
            return Err(CommandError::Failed {
                command: command.to_string(),
                code: Some(1),
                stderr: "unscripted".to_string(),
            });
        };
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        self.completed.lock().unwrap().push(command.to_string());
        scripted.result.map_err(|stderr| CommandError::Failed {
            command: command.to_string(),
            code: Some(128),
            stderr,
        })
    }
}

/// Scripts a repository: optional branch name, upstream yes/no, and the
/// number of unpushed commits. The remote update succeeds.
pub fn scripted_repo(branch: Option<&str>, upstream: bool, unpushed: usize) -> Arc<FakeRunner> {
    let runner = FakeRunner::new();
    runner.ok(&update_cmd("origin"), "Fetching origin");
    match branch {
        Some(name) => runner.ok(CURRENT_BRANCH_CMD, name),
        None => runner.fail(CURRENT_BRANCH_CMD, "fatal: not a branch"),
    };
    if upstream {
        runner.ok(UPSTREAM_CHECK_CMD, "");
        let log: Vec<String> = (0..unpushed)
            .map(|i| format!("{i:07x} commit number {i}"))
            .collect();
        runner.ok(UNPUSHED_LOG_CMD, &log.join("\n"));
    } else {
        runner.fail(UPSTREAM_CHECK_CMD, "fatal: no upstream configured");
        runner.fail(UNPUSHED_LOG_CMD, "fatal: no upstream configured");
    }
    runner
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Status(u64, String),
    Disposed(u64),
    Prompt(String, String),
    Progress(String, String, u8),
    ProgressEnd(String),
    Info(String),
    Error(String),
}

/// Host that records everything and answers prompts with a fixed choice.
pub struct FakeHost {
    answer: bool,
    next_id: AtomicU64,
    events: Arc<Mutex<Vec<HostEvent>>>,
}

impl FakeHost {
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            next_id: AtomicU64::new(0),
            events: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Status(_, text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<String> {
        self.statuses().pop()
    }

    pub fn disposed(&self) -> Vec<u64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Disposed(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn prompts(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Prompt(msg, action) => Some((msg, action)),
                _ => None,
            })
            .collect()
    }

    pub fn progress_messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Progress(_, msg, _) => Some(msg),
                _ => None,
            })
            .collect()
    }
}

struct FakeStatus {
    id: u64,
    events: Arc<Mutex<Vec<HostEvent>>>,
}

impl StatusHandle for FakeStatus {
    fn dispose(self: Box<Self>) {
        self.events.lock().unwrap().push(HostEvent::Disposed(self.id));
    }
}

struct FakeProgress {
    title: String,
    events: Arc<Mutex<Vec<HostEvent>>>,
}

impl Progress for FakeProgress {
    fn report(&mut self, message: &str, increment: u8) {
        self.events.lock().unwrap().push(HostEvent::Progress(
            self.title.clone(),
            message.to_string(),
            increment,
        ));
    }

    fn end(self: Box<Self>) {
        self.events
            .lock()
            .unwrap()
            .push(HostEvent::ProgressEnd(self.title.clone()));
    }
}

#[async_trait]
impl Host for FakeHost {
    fn set_status(&self, text: &str) -> Box<dyn StatusHandle> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.events
            .lock()
            .unwrap()
            .push(HostEvent::Status(id, text.to_string()));
        Box::new(FakeStatus {
            id,
            events: Arc::clone(&self.events),
        })
    }

    async fn prompt(&self, message: &str, action: &str) -> bool {
        self.events
            .lock()
            .unwrap()
            .push(HostEvent::Prompt(message.to_string(), action.to_string()));
        self.answer
    }

    fn begin_progress(&self, title: &str) -> Box<dyn Progress> {
        Box::new(FakeProgress {
            title: title.to_string(),
            events: Arc::clone(&self.events),
        })
    }

    fn info(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(HostEvent::Info(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(HostEvent::Error(message.to_string()));
    }
}

pub async fn build_ctx_in(
    dir: &Path,
    runner: Arc<dyn CommandRunner>,
    host: Arc<dyn Host>,
    config: ReminderConfig,
) -> anyhow::Result<Arc<WatchContext>> {
    build_ctx_logged(dir, runner, host, config, Logger::placeholder()).await
}

pub async fn build_ctx_logged(
    dir: &Path,
    runner: Arc<dyn CommandRunner>,
    host: Arc<dyn Host>,
    config: ReminderConfig,
    logger: Logger,
) -> anyhow::Result<Arc<WatchContext>> {
    Ok(Arc::new(
        WatchContextBuilder::new(dir, config)
            .runner(runner)
            .host(host)
            .logger(logger)
            .build()
            .await?,
    ))
}

/// Logger whose every write fails (the device is always full).
pub async fn failing_logger() -> anyhow::Result<Logger> {
    Logger::new(Path::new("/dev/full")).await
}

pub async fn build_ctx(
    runner: Arc<dyn CommandRunner>,
    host: Arc<dyn Host>,
) -> anyhow::Result<Arc<WatchContext>> {
    build_ctx_in(&std::env::temp_dir(), runner, host, ReminderConfig::default()).await
}
