//! File watcher for the job table and the shown message file.

use camino::{Utf8Path, Utf8PathBuf};
use miette::{IntoDiagnostic, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

/// Events from the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatcherEvent {
    /// A file was created or modified
    Changed(Utf8PathBuf),
    /// Watcher error
    Error(String),
}

/// Watches the job table's directory and the current message directory.
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    receiver: Receiver<WatcherEvent>,
    jobs_dir: Option<Utf8PathBuf>,
    messages_dir: Option<Utf8PathBuf>,
}

impl FileWatcher {
    pub fn new() -> Result<Self> {
        let (tx, rx) = channel();
        Ok(Self {
            watcher: create_watcher(tx)?,
            receiver: rx,
            jobs_dir: None,
            messages_dir: None,
        })
    }

    /// Watch the directory holding the job table file.
    pub fn watch_jobs(&mut self, jobs_file: &Utf8Path) -> Result<()> {
        let dir = parent_dir(jobs_file);
        self.watcher
            .watch(dir.as_std_path(), RecursiveMode::NonRecursive)
            .into_diagnostic()?;
        self.jobs_dir = Some(dir);
        Ok(())
    }

    /// Follow the directory the message panel reads from.
    ///
    /// The directory is watched even before a message file exists in it.
    /// The previous message directory is released unless it also holds
    /// the job table.
    pub fn watch_messages(&mut self, dir: Option<&Utf8Path>) {
        let dir = dir.map(watch_dir);
        if dir == self.messages_dir {
            return;
        }

        if let Some(old) = self.messages_dir.take() {
            if Some(&old) != self.jobs_dir.as_ref() {
                if let Err(e) = self.watcher.unwatch(old.as_std_path()) {
                    tracing::debug!("Cannot unwatch {}: {}", old, e);
                }
            }
        }

        if let Some(dir) = dir {
            if Some(&dir) != self.jobs_dir.as_ref() {
                if let Err(e) = self
                    .watcher
                    .watch(dir.as_std_path(), RecursiveMode::NonRecursive)
                {
                    tracing::warn!("Cannot watch {}: {}", dir, e);
                    return;
                }
            }
            tracing::debug!("Watching messages in {}", dir);
            self.messages_dir = Some(dir);
        }
    }

    /// Try to receive an event without blocking.
    pub fn try_recv_nonblocking(&self) -> Option<WatcherEvent> {
        self.receiver.try_recv().ok()
    }
}

fn parent_dir(file: &Utf8Path) -> Utf8PathBuf {
    watch_dir(file.parent().unwrap_or(Utf8Path::new("")))
}

/// The empty parent of a bare file name is the current directory.
fn watch_dir(dir: &Utf8Path) -> Utf8PathBuf {
    if dir.as_str().is_empty() {
        Utf8PathBuf::from(".")
    } else {
        dir.to_owned()
    }
}

/// Create and configure the file watcher.
fn create_watcher(tx: Sender<WatcherEvent>) -> Result<RecommendedWatcher> {
    RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => handle_event(event, &tx),
            Err(e) => {
                let _ = tx.send(WatcherEvent::Error(e.to_string()));
            }
        },
        Config::default().with_poll_interval(Duration::from_millis(500)),
    )
    .into_diagnostic()
}

/// Handle a file system event.
fn handle_event(event: Event, tx: &Sender<WatcherEvent>) {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return;
    }
    for path in event.paths {
        let Ok(path) = Utf8PathBuf::try_from(path) else {
            continue;
        };
        let _ = tx.send(WatcherEvent::Changed(path));
    }
}
