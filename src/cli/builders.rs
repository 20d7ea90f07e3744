use std::{future::Future, path::Path, sync::Arc};

use anyhow::Result;

use crate::{
    cli::{Cli, Commands},
    config::parser::resolve_config,
    core::{
        manager::{run_once, watch},
        watcher::{WatchContext, WatchContextBuilder},
    },
    git::remote::{RemoteState, check_remote},
};

/// Runs `fut` to completion on a fresh runtime, then shuts the runtime down
/// without waiting for blocking tasks. A prompt still blocked on stdin must
/// not keep the process alive after Ctrl-C.
pub fn block_on_detached<F: Future>(fut: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(fut);
    runtime.shutdown_background();
    Ok(output)
}

pub fn run(cli: &Cli) -> Result<()> {
    block_on_detached(handle_command(cli))?
}

/// Builds the context for the requested workspace, checks its remote and
/// hands over to the watch loop or the one-shot scan.
pub async fn handle_command(cli: &Cli) -> Result<()> {
    let ctx = Arc::new(
        build_context(
            cli.command.path().map(|p| p.as_path()),
            cli.command.config().map(|p| p.as_path()),
        )
        .await?,
    );

    if !ensure_remote(&ctx).await {
        return Ok(());
    }

    match &cli.command {
        Commands::Watch { .. } => watch(ctx).await,
        Commands::Check { .. } => run_once(ctx).await,
    }
}

pub async fn build_context(path: Option<&Path>, config: Option<&Path>) -> Result<WatchContext> {
    let workspace = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let config = resolve_config(config, &workspace)?;
    WatchContextBuilder::new(workspace, config).build().await
}

/// Runs the remote check and tells the user when the workspace cannot be
/// watched. `true` when watching can start.
pub async fn ensure_remote(ctx: &WatchContext) -> bool {
    match check_remote(ctx).await {
        RemoteState::Ready => true,
        RemoteState::NoRepo => {
            ctx.host.info("No remote repository found.");
            false
        }
        RemoteState::FetchError(reason) => {
            ctx.host.error(&format!("Fetch remote error: {reason}."));
            false
        }
    }
}
