use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::UnboundedSender;

pub const HEAD_ENTRY: &str = "HEAD";
pub const BRANCH_REFS_DIR: &str = "refs/heads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchSource {
    Head,
    BranchRefs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEvent {
    pub source: WatchSource,
    pub path: PathBuf,
}

/// Maps a changed path to the watch it belongs to. Entries of the metadata
/// root other than `HEAD` are ignored; anything under `refs/heads` counts.
pub fn source_of(git_dir: &Path, path: &Path) -> Option<WatchSource> {
    if path.starts_with(git_dir.join(BRANCH_REFS_DIR)) {
        return Some(WatchSource::BranchRefs);
    }
    if path.parent() == Some(git_dir) && path.file_name().is_some_and(|n| n == HEAD_ENTRY) {
        return Some(WatchSource::Head);
    }
    None
}

/// Routes one notify callback result: matching paths go to `events`,
/// watcher errors go to `errors`. Access events are dropped.
pub fn forward(
    git_dir: &Path,
    res: notify::Result<Event>,
    events: &UnboundedSender<MetadataEvent>,
    errors: &UnboundedSender<notify::Error>,
) {
    let event = match res {
        Ok(event) => event,
        Err(e) => {
            let _ = errors.send(e);
            return;
        }
    };
    if event.kind.is_access() {
        return;
    }
    for path in event.paths {
        if let Some(source) = source_of(git_dir, &path) {
            // receiver gone means the process loop is shutting down
            let _ = events.send(MetadataEvent { source, path });
        }
    }
}

/// Filesystem watch over the ref pointer and the branch refs of one
/// repository. Dropping it unregisters both watches.
pub struct MetadataWatcher {
    _watcher: RecommendedWatcher,
    git_dir: PathBuf,
}

impl MetadataWatcher {
    pub fn start(
        git_dir: &Path,
        events: UnboundedSender<MetadataEvent>,
        errors: UnboundedSender<notify::Error>,
    ) -> Result<Self> {
        let git_dir = git_dir
            .canonicalize()
            .with_context(|| format!("Cannot resolve metadata directory {}", git_dir.display()))?;
        let refs_dir = git_dir.join(BRANCH_REFS_DIR);

        let root = git_dir.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            forward(&root, res, &events, &errors)
        })?;

        watcher
            .watch(&git_dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", git_dir.display()))?;
        // branch names may contain '/', which git stores as nested directories
        watcher
            .watch(&refs_dir, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", refs_dir.display()))?;

        Ok(Self {
            _watcher: watcher,
            git_dir,
        })
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }
}
