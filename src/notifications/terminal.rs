use std::{
    io::{self, IsTerminal, Write},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;

use crate::notifications::{Host, Progress, StatusHandle};

type CurrentStatus = Arc<Mutex<Option<(u64, String)>>>;

/// Host that renders to stdout and reads answers from stdin.
#[derive(Default)]
pub struct TerminalHost {
    current: CurrentStatus,
    next_id: AtomicU64,
    prompt_turn: tokio::sync::Mutex<()>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_status(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(_, text)| text.clone())
    }
}

struct TerminalStatus {
    id: u64,
    current: CurrentStatus,
}

impl StatusHandle for TerminalStatus {
    fn dispose(self: Box<Self>) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        // a newer status may already have taken the line
        if current.as_ref().is_some_and(|(id, _)| *id == self.id) {
            *current = None;
        }
    }
}

struct TerminalProgress {
    title: String,
    done: u8,
}

impl Progress for TerminalProgress {
    fn report(&mut self, message: &str, increment: u8) {
        self.done = self.done.saturating_add(increment).min(100);
        println!("{}: {message} ({}%)", self.title, self.done);
    }

    fn end(self: Box<Self>) {}
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn ask(question: &str) -> bool {
    print!("{question}");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => false,
        Ok(_) => is_yes(&line),
    }
}

#[async_trait]
impl Host for TerminalHost {
    fn set_status(&self, text: &str) -> Box<dyn StatusHandle> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some((id, text.to_string()));
        println!("{text}");
        Box::new(TerminalStatus {
            id,
            current: Arc::clone(&self.current),
        })
    }

    async fn prompt(&self, message: &str, action: &str) -> bool {
        let _turn = self.prompt_turn.lock().await;
        if !io::stdin().is_terminal() {
            println!("{message}");
            return false;
        }
        let question = format!("{message} [{action}? y/N] ");
        tokio::task::spawn_blocking(move || ask(&question))
            .await
            .unwrap_or(false)
    }

    fn begin_progress(&self, title: &str) -> Box<dyn Progress> {
        Box::new(TerminalProgress {
            title: title.to_string(),
            done: 0,
        })
    }

    fn info(&self, message: &str) {
        println!("ℹ️  {message}");
    }

    fn error(&self, message: &str) {
        eprintln!("❌ Error: {message}");
    }
}
