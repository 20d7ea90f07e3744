use std::{future::Future, sync::Arc};

use anyhow::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::{
    core::{
        debounce::Debouncer,
        metadata::{MetadataEvent, MetadataWatcher},
        scanner::Scanner,
        state::ScanTrigger,
        watcher::WatchContext,
    },
    git::repo::find_git_dir,
};

fn spawn_scan(scanner: &Arc<Scanner>, trigger: ScanTrigger) {
    let scanner = Arc::clone(scanner);
    tokio::spawn(async move { scanner.request(trigger).await });
}

/// Watches the workspace until `shutdown` resolves.
///
/// One scan runs immediately, outside the debounce path. After that, changes
/// to `HEAD` or `refs/heads` go through the debouncer and each surviving
/// change starts a scan; accepted push prompts feed rescans back in.
pub async fn watch_until<F>(ctx: Arc<WatchContext>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let (rescan_tx, mut rescan_rx) = mpsc::unbounded_channel();
    let scanner = Arc::new(Scanner::new(Arc::clone(&ctx), rescan_tx));

    spawn_scan(&scanner, ScanTrigger::Initial);

    let git_dir = find_git_dir(&ctx).await;
    let (change_tx, change_rx) = mpsc::unbounded_channel::<MetadataEvent>();
    let (error_tx, mut error_rx) = mpsc::unbounded_channel::<notify::Error>();
    let watcher = MetadataWatcher::start(&git_dir, change_tx, error_tx)?;
    let _ = ctx
        .logger
        .info(&format!(
            "Watching {} for branch changes",
            watcher.git_dir().display()
        ))
        .await;

    let (fire_tx, mut fire_rx) = mpsc::unbounded_channel::<MetadataEvent>();
    let debouncer = Debouncer::new(ctx.config.debounce());
    let debounce_task = tokio::spawn(debouncer.run(change_rx, fire_tx));

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            Some(event) = fire_rx.recv() => {
                let _ = ctx
                    .logger
                    .info(&format!("{:?} changed: {}", event.source, event.path.display()))
                    .await;
                spawn_scan(&scanner, ScanTrigger::MetadataChange);
            }
            Some(trigger) = rescan_rx.recv() => spawn_scan(&scanner, trigger),
            Some(e) = error_rx.recv() => {
                let _ = ctx.logger.warning(&format!("Watch error: {e}")).await;
            }
            _ = &mut shutdown => break,
        }
    }

    drop(watcher);
    debounce_task.abort();
    ctx.dispose_notification();
    let _ = ctx.logger.info("Watch stopped").await;
    Ok(())
}

pub async fn watch(ctx: Arc<WatchContext>) -> Result<()> {
    watch_until(ctx, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// Single scan for the `check` command. Waits for the prompts it raised and
/// runs the rescans they request before returning.
pub async fn run_once(ctx: Arc<WatchContext>) -> Result<()> {
    let (rescan_tx, mut rescan_rx) = mpsc::unbounded_channel();
    let scanner = Scanner::new(Arc::clone(&ctx), rescan_tx);

    scanner.scan(ScanTrigger::Initial).await;
    scanner.wait_prompts().await;
    drain_rescans(&scanner, &mut rescan_rx).await;

    ctx.dispose_notification();
    Ok(())
}

async fn drain_rescans(scanner: &Scanner, rescan_rx: &mut UnboundedReceiver<ScanTrigger>) {
    while let Ok(trigger) = rescan_rx.try_recv() {
        scanner.scan(trigger).await;
        scanner.wait_prompts().await;
    }
}
