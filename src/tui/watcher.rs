//! File system watcher for live reload.
//!
//! Watches the whole vault recursively and tells the TUI when notes or
//! folders change so the board can be reloaded.

use notify::{
    Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
    event::{AccessKind, AccessMode, ModifyKind},
};
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Manages vault watching for live reload.
pub struct VaultWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<Result<Event, notify::Error>>,
    root: PathBuf,
    /// Debounce: ignore events within this duration of the last reload
    last_reload: Instant,
    debounce_duration: Duration,
    /// Relevant events seen during the debounce window
    pending: bool,
}

impl VaultWatcher {
    /// Start watching `root` and everything below it.
    pub fn new(root: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(root, RecursiveMode::Recursive)?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            root: root.to_path_buf(),
            last_reload: Instant::now(),
            debounce_duration: Duration::from_millis(250),
            pending: false,
        })
    }

    /// Check whether the board should be reloaded.
    pub fn check_for_changes(&mut self) -> bool {
        loop {
            match self.receiver.try_recv() {
                Ok(Ok(event)) => {
                    if self.is_relevant_event(&event) {
                        self.pending = true;
                    }
                }
                Ok(Err(e)) => debug!(error = %e, "watch error"),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if self.pending {
            let now = Instant::now();
            if now.duration_since(self.last_reload) >= self.debounce_duration {
                self.last_reload = now;
                self.pending = false;
                return true;
            }
        }

        false
    }

    /// Drop pending events without reloading (after the app's own writes).
    pub fn drain(&mut self) {
        while self.receiver.try_recv().is_ok() {}
        self.pending = false;
        self.last_reload = Instant::now();
    }

    fn is_relevant_event(&self, event: &Event) -> bool {
        let kind_matches = matches!(
            event.kind,
            EventKind::Modify(ModifyKind::Data(_))
                | EventKind::Modify(ModifyKind::Name(_))
                | EventKind::Modify(ModifyKind::Any)
                | EventKind::Access(AccessKind::Close(AccessMode::Write))
                | EventKind::Create(_)
                | EventKind::Remove(_)
        );

        kind_matches
            && event
                .paths
                .iter()
                .any(|p| is_board_path(&self.root, p))
    }
}

/// Paths whose change can alter a board: notes, media and folders outside hidden directories.
fn is_board_path(root: &Path, path: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };

    let hidden = relative.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    });
    if hidden {
        return false;
    }

    // Folders are reported without extension; so are removed folders
    match path.extension() {
        None => true,
        Some(ext) => {
            let ext = ext.to_string_lossy().to_lowercase();
            ext == "md" || crate::media::MediaKind::from_path(&format!("x.{}", ext)).is_some()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watcher_creation() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(VaultWatcher::new(dir.path()).is_ok());
    }

    #[test]
    fn test_board_paths() {
        let root = Path::new("/vault");
        assert!(is_board_path(root, Path::new("/vault/notes/a.md")));
        assert!(is_board_path(root, Path::new("/vault/img/cover.PNG")));
        assert!(is_board_path(root, Path::new("/vault/trips")));
        assert!(!is_board_path(root, Path::new("/vault/.obsidian/workspace.json")));
        assert!(!is_board_path(root, Path::new("/vault/.git/index")));
        assert!(!is_board_path(root, Path::new("/vault/data.json")));
        assert!(!is_board_path(root, Path::new("/elsewhere/a.md")));
    }
}
