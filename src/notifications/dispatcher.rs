use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::{
    core::{state::ScanTrigger, watcher::WatchContext},
    git::remote::push_branch,
    notifications::{PUSH_ACTION, no_upstream_prompt, push_advice_prompt},
};

/// The two prompts that can end in a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOffer {
    /// Branch has no upstream yet; pushing sets it.
    NoUpstream { branch: String },
    /// Upstream exists but `count` commits are not on it.
    Advice { branch: String, count: usize },
}

impl PushOffer {
    pub fn branch(&self) -> &str {
        match self {
            PushOffer::NoUpstream { branch } | PushOffer::Advice { branch, .. } => branch,
        }
    }

    pub fn set_upstream(&self) -> bool {
        matches!(self, PushOffer::NoUpstream { .. })
    }

    pub fn message(&self, prefix: &str) -> String {
        match self {
            PushOffer::NoUpstream { branch } => no_upstream_prompt(branch, prefix),
            PushOffer::Advice { branch, count } => push_advice_prompt(*count, branch, prefix),
        }
    }
}

/// Shows `offer` and waits for the user. Declining does nothing. Accepting
/// pushes the branch and requests exactly one `PostPushRescan`.
///
/// Returns whether the offer was accepted.
pub async fn dispatch_offer(
    ctx: Arc<WatchContext>,
    offer: PushOffer,
    rescan: UnboundedSender<ScanTrigger>,
) -> bool {
    let message = offer.message(&ctx.config.status_prefix);
    if !ctx.host.prompt(&message, PUSH_ACTION).await {
        let _ = ctx
            .logger
            .info(&format!("Push offer for <{}> dismissed", offer.branch()))
            .await;
        return false;
    }

    push_with_progress(&ctx, offer.branch(), offer.set_upstream()).await;

    if rescan.send(ScanTrigger::PostPushRescan).is_err() {
        let _ = ctx
            .logger
            .warning("Rescan requested after push but the watch loop is gone")
            .await;
    }
    true
}

/// Push outcome is not inspected here; the follow-up scan shows whether the
/// branch is in sync.
pub async fn push_with_progress(ctx: &WatchContext, branch: &str, set_upstream: bool) {
    ctx.dispose_notification();

    let mut progress = ctx.host.begin_progress(&format!("Push branch <{branch}>"));
    progress.report("Pushing...", 20);
    let _ = push_branch(ctx, branch, set_upstream).await;
    progress.report("Pushed", 100);
    progress.end();
}
