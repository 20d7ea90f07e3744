use std::time::Duration;

use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender},
    time::{Instant, sleep_until},
};

/// Trailing-edge debounce with a single shared timer.
///
/// Every [`Debouncer::trigger`] replaces the pending value and pushes the
/// deadline back by the quiet window. Only the last value of a burst is
/// ever emitted; earlier ones are dropped, not queued.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            deadline: None,
        }
    }

    pub fn trigger(&mut self, value: T) {
        self.pending = Some(value);
        self.deadline = Some(Instant::now() + self.quiet);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the pending value once the quiet window has passed.
    pub fn take_expired(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    /// Feeds values from `input` through the debounce window and forwards
    /// the survivors to `output`. Ends when either side closes; a value
    /// still pending at that point is dropped.
    pub async fn run(mut self, mut input: UnboundedReceiver<T>, output: UnboundedSender<T>) {
        loop {
            let deadline = self.deadline;
            tokio::select! {
                msg = input.recv() => match msg {
                    Some(value) => self.trigger(value),
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(value) = self.take_expired(Instant::now())
                        && output.send(value).is_err()
                    {
                        break;
                    }
                }
            }
        }
    }
}
