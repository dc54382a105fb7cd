//! Board model: the cards of one vault folder and the folder stack.
//!
//! A board shows the children of the folder on top of the [`FolderStack`].
//! Folder cards lead deeper into the vault; note cards carry the thumbnail
//! taken from the first image or video the note embeds.

use crate::error::Result;
use crate::media::{MediaKind, ScanMode, first_reference};
use crate::vault::{Entry, Resolver, TextStore, Vault};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The resolved file that represents a note on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    pub path: PathBuf,
    pub kind: MediaKind,
}

/// One tile of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    #[serde(flatten)]
    pub entry: Entry,
    pub thumbnail: Option<Thumbnail>,
}

impl Card {
    pub fn title(&self) -> &str {
        self.entry.name()
    }

    pub fn is_folder(&self) -> bool {
        self.entry.is_folder()
    }
}

/// Stack of folders the user walked into. The bottom is always the vault
/// root and is never popped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderStack {
    folders: Vec<PathBuf>,
}

impl FolderStack {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            folders: vec![root.into()],
        }
    }

    /// Folder currently shown
    pub fn current(&self) -> &Path {
        // The root is never popped, so the stack is never empty
        self.folders.last().map(PathBuf::as_path).unwrap_or(Path::new(""))
    }

    pub fn root(&self) -> &Path {
        &self.folders[0]
    }

    pub fn push(&mut self, folder: impl Into<PathBuf>) {
        self.folders.push(folder.into());
    }

    /// Leave the current folder. Returns false when already at the root.
    pub fn pop(&mut self) -> bool {
        if self.can_go_back() {
            self.folders.pop();
            true
        } else {
            false
        }
    }

    pub fn depth(&self) -> usize {
        self.folders.len()
    }

    pub fn can_go_back(&self) -> bool {
        self.folders.len() > 1
    }

    /// Folder names from the root down, e.g. `["vault", "trips", "2024"]`.
    pub fn breadcrumb(&self) -> Vec<String> {
        self.folders
            .iter()
            .map(|f| {
                f.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| f.display().to_string())
            })
            .collect()
    }

    /// Replace the stack with the path from the root down to `folder`.
    ///
    /// Used when the board is opened directly on a subfolder. `folder` must
    /// live under the root; otherwise the stack is left at the root.
    pub fn open_at(&mut self, folder: &Path) {
        self.folders.truncate(1);
        let Ok(relative) = folder.strip_prefix(self.root()) else {
            return;
        };
        let mut current = self.root().to_path_buf();
        for component in relative.components() {
            current.push(component);
            self.folders.push(current.clone());
        }
    }
}

/// Thumbnail of a note: its first embed, if that resolves.
///
/// Only the first reference is considered; a first reference that does not
/// resolve means the card has no thumbnail.
pub fn thumbnail_for<S, R>(store: &S, resolver: &R, note: &Path) -> Result<Option<Thumbnail>>
where
    S: TextStore + ?Sized,
    R: Resolver + ?Sized,
{
    let text = store.read(note)?;
    let Some(reference) = first_reference(&text, ScanMode::Thumbnail) else {
        return Ok(None);
    };

    let thumbnail = resolver
        .resolve(&reference.path, note)
        .map(|path| Thumbnail {
            path,
            kind: reference.kind,
        });

    if thumbnail.is_none() {
        debug!(note = %note.display(), embed = %reference.path, "thumbnail did not resolve");
    }
    Ok(thumbnail)
}

/// Build the card for one folder entry.
///
/// A note that cannot be read still gets a card, without thumbnail.
pub fn card_for(vault: &Vault, entry: Entry, show_videos: bool) -> Card {
    let thumbnail = match &entry {
        Entry::Folder { .. } => None,
        Entry::Note { path, .. } => match thumbnail_for(vault, vault, path) {
            Ok(thumbnail) => thumbnail.filter(|t| show_videos || t.kind == MediaKind::Image),
            Err(e) => {
                warn!(note = %path.display(), error = %e, "could not read note for thumbnail");
                None
            }
        },
    };

    Card { entry, thumbnail }
}

/// Load every card of a folder.
pub fn load_board(vault: &Vault, folder: &Path, show_videos: bool) -> Result<Vec<Card>> {
    let entries = vault.list_folder(folder)?;
    Ok(entries
        .into_iter()
        .map(|entry| card_for(vault, entry, show_videos))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Vault) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("trips")).unwrap();
        fs::create_dir_all(root.join("media")).unwrap();
        fs::write(root.join("media/a.png"), b"png").unwrap();
        fs::write(root.join("media/clip.mp4"), b"mp4").unwrap();

        fs::write(root.join("with-image.md"), "# A\n\n![[a.png]]").unwrap();
        fs::write(root.join("with-video.md"), "![](media/clip.mp4) ![[a.png]]").unwrap();
        fs::write(root.join("broken.md"), "![[missing.png]] ![[a.png]]").unwrap();
        fs::write(root.join("plain.md"), "nothing to see").unwrap();

        let vault = Vault::open(root).unwrap();
        (dir, vault)
    }

    fn card<'a>(cards: &'a [Card], title: &str) -> &'a Card {
        cards.iter().find(|c| c.title() == title).unwrap()
    }

    #[test]
    fn test_load_board() {
        let (_dir, vault) = fixture();
        let cards = load_board(&vault, vault.root(), true).unwrap();

        assert_eq!(cards.len(), 6);
        assert!(cards[0].is_folder());
        assert!(cards[1].is_folder());

        let image = card(&cards, "with-image").thumbnail.as_ref().unwrap();
        assert_eq!(image.path, vault.root().join("media/a.png"));
        assert_eq!(image.kind, MediaKind::Image);

        let video = card(&cards, "with-video").thumbnail.as_ref().unwrap();
        assert_eq!(video.kind, MediaKind::Video);

        assert!(card(&cards, "plain").thumbnail.is_none());
        assert!(card(&cards, "trips").thumbnail.is_none());
    }

    #[test]
    fn test_unresolved_first_embed_means_no_thumbnail() {
        let (_dir, vault) = fixture();
        let cards = load_board(&vault, vault.root(), true).unwrap();

        assert!(card(&cards, "broken").thumbnail.is_none());
    }

    #[test]
    fn test_hidden_videos() {
        let (_dir, vault) = fixture();
        let cards = load_board(&vault, vault.root(), false).unwrap();

        assert!(card(&cards, "with-video").thumbnail.is_none());
        assert!(card(&cards, "with-image").thumbnail.is_some());
    }

    #[test]
    fn test_folder_stack_never_pops_root() {
        let mut stack = FolderStack::new("/vault");
        assert!(!stack.can_go_back());
        assert!(!stack.pop());
        assert_eq!(stack.current(), Path::new("/vault"));

        stack.push("/vault/trips");
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.current(), Path::new("/vault/trips"));

        assert!(stack.pop());
        assert!(!stack.pop());
        assert_eq!(stack.current(), Path::new("/vault"));
    }

    #[test]
    fn test_breadcrumb_and_open_at() {
        let mut stack = FolderStack::new("/vault");
        stack.open_at(Path::new("/vault/trips/2024"));

        assert_eq!(stack.breadcrumb(), vec!["vault", "trips", "2024"]);
        assert_eq!(stack.current(), Path::new("/vault/trips/2024"));

        stack.open_at(Path::new("/elsewhere"));
        assert_eq!(stack.depth(), 1);
    }
}
