use std::sync::{Arc, Mutex, PoisonError};

use tokio::{
    sync::{mpsc::UnboundedSender, watch},
    task::JoinHandle,
};

use crate::{
    core::{
        state::{ScanReport, ScanState, ScanTrigger},
        watcher::WatchContext,
    },
    git::{
        remote::{RemoteSyncOutcome, sync_remote},
        repo::{BranchInfo, BranchState, classify, count_unpushed},
    },
    notifications::{
        dispatcher::{PushOffer, dispatch_offer},
        status_text,
    },
};

#[derive(Debug, Default)]
struct Gate {
    running: bool,
    pending: Option<ScanTrigger>,
}

/// Resets the gate if a scan unwinds before releasing it.
struct GateGuard<'a> {
    gate: &'a Mutex<Gate>,
    armed: bool,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
            gate.running = false;
            gate.pending = None;
        }
    }
}

/// Scan orchestrator: sync, classify, count, report.
pub struct Scanner {
    ctx: Arc<WatchContext>,
    rescan: UnboundedSender<ScanTrigger>,
    state: watch::Sender<ScanState>,
    gate: Mutex<Gate>,
    prompts: Mutex<Vec<JoinHandle<bool>>>,
}

impl Scanner {
    pub fn new(ctx: Arc<WatchContext>, rescan: UnboundedSender<ScanTrigger>) -> Self {
        let (state, _) = watch::channel(ScanState::Idle);
        Self {
            ctx,
            rescan,
            state,
            gate: Mutex::new(Gate::default()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ScanState {
        *self.state.borrow()
    }

    fn set_state(&self, state: ScanState) {
        self.state.send_replace(state);
    }

    /// Guarded entry point used by the watch loop.
    ///
    /// A trigger that arrives while a scan is running is remembered (latest
    /// wins) and runs once the current scan is over, instead of starting a
    /// second pipeline next to it.
    pub async fn request(&self, trigger: ScanTrigger) {
        let deferred = {
            let mut gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
            if gate.running {
                gate.pending = Some(trigger);
            } else {
                gate.running = true;
            }
            gate.pending.is_some()
        };
        if deferred {
            let _ = self
                .ctx
                .logger
                .info(&format!("Scan in progress, `{trigger}` deferred"))
                .await;
            return;
        }

        let mut guard = GateGuard {
            gate: &self.gate,
            armed: true,
        };
        let mut next = trigger;
        loop {
            self.scan(next).await;
            let pending = {
                let mut gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
                let pending = gate.pending.take();
                if pending.is_none() {
                    gate.running = false;
                }
                pending
            };
            match pending {
                Some(trigger) => next = trigger,
                None => break,
            }
        }
        guard.armed = false;
    }

    /// Runs the pipeline once. Command failures along the way are folded
    /// into the report; logging failures never stop a scan.
    pub async fn scan(&self, trigger: ScanTrigger) -> ScanReport {
        let _ = self
            .ctx
            .logger
            .scan_start(&format!("scanning for un-pushed commits by: {trigger}"))
            .await;

        let report = self.run_pipeline().await;
        self.set_state(ScanState::Idle);

        let _ = self
            .ctx
            .logger
            .scan_end(&format!("{trigger}: {report:?}"))
            .await;
        report
    }

    async fn run_pipeline(&self) -> ScanReport {
        // no stale "all pushed" while the remote is being synced
        self.ctx.dispose_notification();

        self.set_state(ScanState::Syncing);
        let outcome = self.sync_with_progress().await;
        if outcome != RemoteSyncOutcome::Updated {
            let _ = self.ctx.logger.warning(&outcome.message()).await;
        }

        self.set_state(ScanState::Classifying);
        let BranchInfo { state, branch } = classify(&self.ctx).await;
        match state {
            BranchState::Tracked => {}
            BranchState::NoUpstream => {
                self.set_state(ScanState::Reporting);
                return self.report_no_upstream(branch);
            }
            BranchState::Detached => {
                self.set_state(ScanState::Reporting);
                return self.report_detached();
            }
        }

        self.set_state(ScanState::Counting);
        let count = count_unpushed(&self.ctx).await;

        self.set_state(ScanState::Reporting);
        let report = if count == 0 {
            ScanReport::Synced {
                branch: branch.clone(),
            }
        } else {
            ScanReport::Unpushed {
                branch: branch.clone(),
                count,
            }
        };
        self.ctx
            .show_status(&status_text(&report, &self.ctx.config.status_prefix));

        if count >= self.ctx.config.push_prompt_threshold {
            self.offer(PushOffer::Advice { branch, count });
        }
        report
    }

    async fn sync_with_progress(&self) -> RemoteSyncOutcome {
        let mut progress = self.ctx.host.begin_progress("Sync remote");
        progress.report(&format!("Sync remote {}...", self.ctx.config.remote), 20);
        let res = sync_remote(&self.ctx).await;
        let outcome = RemoteSyncOutcome::from(&res);
        progress.report(&outcome.message(), 100);
        progress.end();
        outcome
    }

    fn report_no_upstream(&self, branch: String) -> ScanReport {
        let report = ScanReport::NoUpstream {
            branch: branch.clone(),
        };
        self.ctx
            .show_status(&status_text(&report, &self.ctx.config.status_prefix));
        self.offer(PushOffer::NoUpstream { branch });
        report
    }

    fn report_detached(&self) -> ScanReport {
        let report = ScanReport::Detached;
        self.ctx
            .show_status(&status_text(&report, &self.ctx.config.status_prefix));
        report
    }

    /// Prompts run detached so the next scan is not held up by a user who
    /// has not answered yet.
    fn offer(&self, offer: PushOffer) {
        let handle = tokio::spawn(dispatch_offer(
            Arc::clone(&self.ctx),
            offer,
            self.rescan.clone(),
        ));
        let mut prompts = self.prompts.lock().unwrap_or_else(PoisonError::into_inner);
        prompts.retain(|h| !h.is_finished());
        prompts.push(handle);
    }

    /// Waits for the prompts still outstanding. Returns, per prompt, whether
    /// it was accepted.
    pub async fn wait_prompts(&self) -> Vec<bool> {
        let handles: Vec<_> = {
            let mut prompts = self.prompts.lock().unwrap_or_else(PoisonError::into_inner);
            prompts.drain(..).collect()
        };
        let mut accepted = Vec::with_capacity(handles.len());
        for handle in handles {
            accepted.push(handle.await.unwrap_or(false));
        }
        accepted
    }
}
