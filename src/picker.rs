//! Thumbnail picker session for one note.
//!
//! Opening a session reads the note once and keeps that text as a snapshot.
//! Browsing never touches the disk except to resolve the image under the
//! cursor. Committing rewrites the snapshot and saves it only if the note
//! still matches the snapshot, so edits made elsewhere while the picker was
//! open are not lost.

use crate::error::Result;
use crate::media::{Direction, MediaReference, ScanMode, SelectionState, scan};
use crate::vault::{Resolver, TextStore};
use std::path::{Path, PathBuf};
use tracing::info;

/// One open thumbnail picker.
#[derive(Debug, Clone)]
pub struct PickerSession {
    note: PathBuf,
    snapshot: String,
    selection: SelectionState,
}

impl PickerSession {
    /// Read `note` and collect the images it embeds.
    pub fn open<S>(store: &S, note: &Path) -> Result<Self>
    where
        S: TextStore + ?Sized,
    {
        let snapshot = store.read(note)?;
        let selection = SelectionState::new(scan(&snapshot, ScanMode::Picker));

        Ok(Self {
            note: note.to_path_buf(),
            snapshot,
            selection,
        })
    }

    pub fn note(&self) -> &Path {
        &self.note
    }

    /// Note name without extension, for titles
    pub fn note_name(&self) -> String {
        self.note
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    pub fn navigate(&mut self, direction: Direction) {
        self.selection.navigate(direction);
    }

    pub fn current(&self) -> Option<&MediaReference> {
        self.selection.current()
    }

    /// One-based position and total, e.g. `(2, 5)`.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.selection
            .current_index()
            .map(|index| (index + 1, self.selection.len()))
    }

    /// File to display for the image under the cursor.
    pub fn display_target<R>(&self, resolver: &R) -> Option<PathBuf>
    where
        R: Resolver + ?Sized,
    {
        self.selection.current_display_target(resolver, &self.note)
    }

    /// Move the image under the cursor to the top of the note and save it.
    ///
    /// Returns the new note text, or `None` when the note has no images.
    /// Fails with [`VaultError::StaleNote`](crate::error::VaultError::StaleNote)
    /// if the note changed since the session was opened.
    pub fn commit<S>(self, store: &S) -> Result<Option<String>>
    where
        S: TextStore + ?Sized,
    {
        let Some(new_text) = self.selection.commit(&self.snapshot) else {
            return Ok(None);
        };

        store.write_if_unchanged(&self.note, &self.snapshot, &new_text)?;

        if let Some(reference) = self.selection.current() {
            info!(note = %self.note.display(), thumbnail = %reference.path, "thumbnail changed");
        }
        Ok(Some(new_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VaultError;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory store for exercising sessions without a filesystem
    #[derive(Default)]
    struct MemoryStore {
        notes: RefCell<HashMap<PathBuf, String>>,
    }

    impl MemoryStore {
        fn with(note: &str, text: &str) -> Self {
            let store = Self::default();
            store
                .notes
                .borrow_mut()
                .insert(PathBuf::from(note), text.to_string());
            store
        }

        fn get(&self, note: &str) -> String {
            self.notes.borrow()[Path::new(note)].clone()
        }
    }

    impl TextStore for MemoryStore {
        fn read(&self, note: &Path) -> Result<String> {
            self.notes
                .borrow()
                .get(note)
                .cloned()
                .ok_or_else(|| VaultError::NotFound(note.to_path_buf()))
        }

        fn write(&self, note: &Path, text: &str) -> Result<()> {
            self.notes
                .borrow_mut()
                .insert(note.to_path_buf(), text.to_string());
            Ok(())
        }
    }

    impl Resolver for MemoryStore {
        fn resolve(&self, path: &str, _note: &Path) -> Option<PathBuf> {
            path.starts_with("ok").then(|| PathBuf::from("/res").join(path))
        }
    }

    #[test]
    fn test_open_and_browse() {
        let store = MemoryStore::with("n.md", "![[ok1.png]] ![[clip.mp4]] ![](bad.png)");
        let mut session = PickerSession::open(&store, Path::new("n.md")).unwrap();

        // videos are not offered by the picker
        assert_eq!(session.position(), Some((1, 2)));
        assert_eq!(session.display_target(&store), Some(PathBuf::from("/res/ok1.png")));

        session.navigate(Direction::Next);
        assert_eq!(session.position(), Some((2, 2)));
        assert_eq!(session.display_target(&store), None);
        assert_eq!(session.note_name(), "n");
    }

    #[test]
    fn test_open_missing_note() {
        let store = MemoryStore::default();
        let err = PickerSession::open(&store, Path::new("gone.md")).unwrap_err();
        assert!(matches!(err, VaultError::NotFound(_)));
    }

    #[test]
    fn test_commit_writes_note() {
        let store = MemoryStore::with("n.md", "intro ![[ok1.png]] mid ![](ok2.jpg) end");
        let mut session = PickerSession::open(&store, Path::new("n.md")).unwrap();
        session.navigate(Direction::Previous);

        let new_text = session.commit(&store).unwrap().unwrap();
        assert_eq!(new_text, "![[ok2.jpg]]\n\nintro ![[ok1.png]] mid  end");
        assert_eq!(store.get("n.md"), new_text);
    }

    #[test]
    fn test_commit_empty_session() {
        let store = MemoryStore::with("n.md", "no pictures");
        let session = PickerSession::open(&store, Path::new("n.md")).unwrap();

        assert!(session.is_empty());
        assert_eq!(session.position(), None);
        assert_eq!(session.commit(&store).unwrap(), None);
        assert_eq!(store.get("n.md"), "no pictures");
    }

    #[test]
    fn test_commit_rejects_stale_snapshot() {
        let store = MemoryStore::with("n.md", "![[ok1.png]] ![[ok2.png]]");
        let first = PickerSession::open(&store, Path::new("n.md")).unwrap();
        let mut second = PickerSession::open(&store, Path::new("n.md")).unwrap();
        second.navigate(Direction::Next);

        second.commit(&store).unwrap();
        let err = first.commit(&store).unwrap_err();

        assert!(matches!(err, VaultError::StaleNote(_)));
        assert_eq!(store.get("n.md"), "![[ok2.png]]\n\n![[ok1.png]] ");
    }
}
