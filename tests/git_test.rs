mod common;

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use common::{FakeHost, build_ctx_in};
use core_lib::{
    config::ReminderConfig,
    core::{
        manager::run_once,
        scanner::Scanner,
        state::{ScanReport, ScanTrigger},
        watcher::WatchContext,
    },
    exec::{CommandError, CommandRunner, ShellRunner},
    git::{
        remote::{RemoteState, check_remote, push_branch},
        repo::{BranchState, classify, count_unpushed, find_git_dir},
    },
    log::Logger,
};
use git2::{Commit, Oid, Repository, RepositoryInitOptions, Signature};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio::sync::mpsc;

struct Fixture {
    _dir: TempDir,
    work: PathBuf,
    origin: PathBuf,
    repo: Repository,
}

fn init_fixture() -> anyhow::Result<Fixture> {
    let dir = tempfile::tempdir()?;
    let work = dir.path().join("work");
    let origin = dir.path().join("origin.git");

    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = Repository::init_opts(&work, &opts)?;
    Repository::init_bare(&origin)?;

    Ok(Fixture {
        _dir: dir,
        work,
        origin,
        repo,
    })
}

fn commit(repo: &Repository, file: &str, content: &str) -> anyhow::Result<Oid> {
    let workdir = repo
        .workdir()
        .ok_or_else(|| anyhow::anyhow!("bare repository"))?;
    fs::write(workdir.join(file), content)?;

    let mut index = repo.index()?;
    index.add_path(Path::new(file))?;
    index.write()?;
    let tree = repo.find_tree(index.write_tree()?)?;

    let sig = Signature::now("Reminder Test", "test@example.com")?;
    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit()?),
        Err(_) => None,
    };
    let parents: Vec<&Commit> = parent.iter().collect();
    Ok(repo.commit(Some("HEAD"), &sig, &sig, content, &tree, &parents)?)
}

async fn shell_ctx(work: &Path, host: Arc<FakeHost>) -> anyhow::Result<Arc<WatchContext>> {
    build_ctx_in(
        work,
        Arc::new(ShellRunner::new(Logger::placeholder())),
        host,
        ReminderConfig::default(),
    )
    .await
}

fn add_origin(fx: &Fixture) -> anyhow::Result<()> {
    let url = fx
        .origin
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("non utf-8 path"))?;
    fx.repo.remote("origin", url)?;
    Ok(())
}

#[tokio::test]
async fn test_shell_runner_output_and_errors() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let runner = ShellRunner::new(Logger::placeholder());

    assert_eq!(runner.run("echo '  hi  '", dir.path()).await?, "hi");

    match runner.run("sh -c 'exit 3'", dir.path()).await {
        Err(CommandError::Failed { code, .. }) => assert_eq!(code, Some(3)),
        other => panic!("expected a failed command, got {other:?}"),
    }
    assert!(matches!(
        runner.run("", dir.path()).await,
        Err(CommandError::EmptyCommand)
    ));
    assert!(matches!(
        runner.run("echo 'unbalanced", dir.path()).await,
        Err(CommandError::Parse { .. })
    ));
    assert!(matches!(
        runner.run("git-reminder-no-such-binary", dir.path()).await,
        Err(CommandError::Spawn { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_branch_without_upstream() -> anyhow::Result<()> {
    let fx = init_fixture()?;
    commit(&fx.repo, "a.txt", "first")?;
    let ctx = shell_ctx(&fx.work, FakeHost::answering(false)).await?;

    let info = classify(&ctx).await;
    assert_eq!(info.state, BranchState::NoUpstream);
    assert_eq!(info.branch, "main");
    assert_eq!(
        find_git_dir(&ctx).await.canonicalize()?,
        fx.work.join(".git").canonicalize()?
    );
    Ok(())
}

#[tokio::test]
async fn test_detached_head() -> anyhow::Result<()> {
    let fx = init_fixture()?;
    let first = commit(&fx.repo, "a.txt", "first")?;
    commit(&fx.repo, "a.txt", "second")?;
    fx.repo.set_head_detached(first)?;
    let ctx = shell_ctx(&fx.work, FakeHost::answering(false)).await?;

    assert_eq!(classify(&ctx).await.state, BranchState::Detached);
    Ok(())
}

#[tokio::test]
async fn test_push_sets_upstream_then_counts() -> anyhow::Result<()> {
    let fx = init_fixture()?;
    commit(&fx.repo, "a.txt", "first")?;
    add_origin(&fx)?;
    let ctx = shell_ctx(&fx.work, FakeHost::answering(false)).await?;

    push_branch(&ctx, "main", true).await?;
    let info = classify(&ctx).await;
    assert_eq!(info.state, BranchState::Tracked);
    assert_eq!(count_unpushed(&ctx).await, 0);

    commit(&fx.repo, "a.txt", "second")?;
    commit(&fx.repo, "b.txt", "third")?;
    assert_eq!(count_unpushed(&ctx).await, 2);
    Ok(())
}

#[tokio::test]
async fn test_check_remote_states() -> anyhow::Result<()> {
    let plain = tempfile::tempdir()?;
    let ctx = shell_ctx(plain.path(), FakeHost::answering(false)).await?;
    assert_eq!(check_remote(&ctx).await, RemoteState::NoRepo);

    let fx = init_fixture()?;
    commit(&fx.repo, "a.txt", "first")?;
    let ctx = shell_ctx(&fx.work, FakeHost::answering(false)).await?;
    assert_eq!(check_remote(&ctx).await, RemoteState::NoRepo);

    add_origin(&fx)?;
    assert_eq!(check_remote(&ctx).await, RemoteState::Ready);
    Ok(())
}

#[tokio::test]
async fn test_scan_push_and_rescan() -> anyhow::Result<()> {
    let fx = init_fixture()?;
    commit(&fx.repo, "a.txt", "first")?;
    add_origin(&fx)?;
    let host = FakeHost::answering(true);
    let ctx = shell_ctx(&fx.work, host.clone()).await?;
    push_branch(&ctx, "main", true).await?;

    commit(&fx.repo, "a.txt", "second")?;
    commit(&fx.repo, "a.txt", "third")?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let scanner = Scanner::new(Arc::clone(&ctx), tx);
    let report = scanner.scan(ScanTrigger::MetadataChange).await;
    assert_eq!(
        report,
        ScanReport::Unpushed {
            branch: "main".to_string(),
            count: 2
        }
    );
    assert_eq!(scanner.wait_prompts().await, vec![true]);

    let trigger = rx.try_recv()?;
    assert_eq!(trigger, ScanTrigger::PostPushRescan);
    let report = scanner.scan(trigger).await;
    assert_eq!(
        report,
        ScanReport::Synced {
            branch: "main".to_string()
        }
    );
    assert!(host.last_status().unwrap().contains("fully synced"));
    Ok(())
}

#[tokio::test]
async fn test_run_once_pushes_new_branch() -> anyhow::Result<()> {
    let fx = init_fixture()?;
    commit(&fx.repo, "a.txt", "first")?;
    add_origin(&fx)?;
    let host = FakeHost::answering(true);
    let ctx = shell_ctx(&fx.work, host.clone()).await?;

    run_once(Arc::clone(&ctx)).await?;

    // the no-upstream offer was accepted and the rescan found it in sync
    assert_eq!(host.prompts().len(), 1);
    assert!(host.statuses().last().unwrap().contains("fully synced"));
    assert!(!ctx.has_notification());
    let origin = Repository::open_bare(&fx.origin)?;
    assert!(origin.find_reference("refs/heads/main").is_ok());
    Ok(())
}
