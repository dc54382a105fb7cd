//! Filesystem-backed vault of markdown notes.
//!
//! The vault is a plain directory tree. It plays two roles for the rest of
//! the crate:
//!
//! - [`TextStore`]: reading and (atomically) writing note text
//! - [`Resolver`]: turning an embed path from a note into a real file
//!
//! Both are traits so the selection logic can be exercised without touching
//! the disk.

use crate::error::{Result, VaultError};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Read and write access to note text.
pub trait TextStore {
    /// Read the full text of a note.
    fn read(&self, note: &Path) -> Result<String>;

    /// Replace the full text of a note.
    fn write(&self, note: &Path, text: &str) -> Result<()>;

    /// Replace the text of a note only if it still reads as `expected`.
    ///
    /// Fails with [`VaultError::StaleNote`] when the note was modified after
    /// `expected` was read, so a second editor's changes are never clobbered.
    fn write_if_unchanged(&self, note: &Path, expected: &str, text: &str) -> Result<()> {
        let current = self.read(note)?;
        if current != expected {
            return Err(VaultError::StaleNote(note.to_path_buf()));
        }
        self.write(note, text)
    }
}

/// Maps an embed path, as written in a note, to a displayable file.
pub trait Resolver {
    /// Resolve `path` in the context of the note that embeds it.
    ///
    /// Returns `None` when nothing matches; callers treat that as "no
    /// thumbnail" rather than as an error.
    fn resolve(&self, path: &str, note: &Path) -> Option<PathBuf>;
}

/// A child of a vault folder shown on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entry {
    Folder { name: String, path: PathBuf },
    Note { name: String, path: PathBuf },
}

impl Entry {
    /// Display name: folder name, or note file name without `.md`
    pub fn name(&self) -> &str {
        match self {
            Entry::Folder { name, .. } | Entry::Note { name, .. } => name,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Entry::Folder { path, .. } | Entry::Note { path, .. } => path,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Entry::Folder { .. })
    }
}

/// A directory of markdown notes.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    /// Open a vault rooted at `root`.
    ///
    /// The root is canonicalized so every path handed out by the vault is
    /// absolute.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .map_err(|e| VaultError::io(root, e))?;

        if !root.is_dir() {
            return Err(VaultError::NotADirectory(root));
        }

        info!(root = %root.display(), "opened vault");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name of the vault directory
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    /// Path relative to the vault root, for display.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Turn a vault-relative or absolute path into an absolute path inside
    /// the vault.
    pub fn locate(&self, path: &Path) -> Result<PathBuf> {
        let joined = if path.is_absolute() {
            lexical_normalize(path)
        } else {
            lexical_normalize(&self.root.join(path))
        };

        if joined.starts_with(&self.root) {
            Ok(joined)
        } else {
            Err(VaultError::OutsideVault(path.to_path_buf()))
        }
    }

    /// List the subfolders and markdown notes of a folder.
    ///
    /// Folders come first, then notes; each group is sorted by name without
    /// regard to case. Hidden entries (names starting with `.`) are skipped.
    pub fn list_folder(&self, folder: &Path) -> Result<Vec<Entry>> {
        let folder = self.locate(folder)?;
        if !folder.is_dir() {
            return Err(VaultError::NotADirectory(folder));
        }

        let read_dir = fs::read_dir(&folder).map_err(|e| VaultError::io(&folder, e))?;

        let mut folders = Vec::new();
        let mut notes = Vec::new();

        for dir_entry in read_dir.filter_map(|e| e.ok()) {
            let path = dir_entry.path();
            let file_name = dir_entry.file_name().to_string_lossy().to_string();
            if file_name.starts_with('.') {
                continue;
            }

            if path.is_dir() {
                folders.push(Entry::Folder {
                    name: file_name,
                    path,
                });
            } else if is_markdown(&path) {
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or(file_name);
                notes.push(Entry::Note { name, path });
            }
        }

        folders.sort_by_key(|e| e.name().to_lowercase());
        notes.sort_by_key(|e| e.name().to_lowercase());
        folders.extend(notes);

        debug!(folder = %folder.display(), entries = folders.len(), "listed folder");
        Ok(folders)
    }

    /// All files in the vault outside hidden directories.
    fn files(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    debug!(error = %err, "skipping unreadable vault entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(DirEntry::into_path)
            .collect()
    }

    /// Find a file anywhere in the vault by file name.
    ///
    /// When several files share the name, the one with the shortest
    /// vault-relative path wins, then the lexicographically smallest.
    fn find_by_name(&self, path: &Path) -> Option<PathBuf> {
        let wanted = path.file_name()?;

        self.files()
            .into_iter()
            .filter(|file| file.file_name() == Some(wanted))
            .min_by(|a, b| {
                let a_rel = self.relative(a);
                let b_rel = self.relative(b);
                a_rel
                    .components()
                    .count()
                    .cmp(&b_rel.components().count())
                    .then_with(|| a_rel.cmp(b_rel))
            })
    }

    fn existing_inside(&self, candidate: PathBuf) -> Option<PathBuf> {
        let candidate = lexical_normalize(&candidate);
        if !candidate.starts_with(&self.root) {
            warn!(path = %candidate.display(), "embed path escapes the vault");
            return None;
        }
        candidate.is_file().then_some(candidate)
    }
}

impl TextStore for Vault {
    fn read(&self, note: &Path) -> Result<String> {
        let path = self.locate(note)?;
        fs::read_to_string(&path).map_err(|e| VaultError::io(&path, e))
    }

    fn write(&self, note: &Path, text: &str) -> Result<()> {
        let path = self.locate(note)?;

        // Atomic write: write to temp file, then rename (prevents data corruption)
        let parent_dir = path
            .parent()
            .ok_or_else(|| VaultError::OutsideVault(path.clone()))?;

        let mut temp_file =
            tempfile::NamedTempFile::new_in(parent_dir).map_err(|e| VaultError::io(&path, e))?;

        temp_file
            .write_all(text.as_bytes())
            .map_err(|e| VaultError::io(&path, e))?;
        temp_file.flush().map_err(|e| VaultError::io(&path, e))?;

        // Keep the note's permissions rather than the temp file's
        if let Ok(metadata) = fs::metadata(&path) {
            let _ = temp_file.as_file().set_permissions(metadata.permissions());
        }

        // Atomic rename (same filesystem guarantees atomicity)
        temp_file
            .persist(&path)
            .map_err(|e| VaultError::io(&path, e.error))?;

        info!(note = %self.relative(&path).display(), bytes = text.len(), "saved note");
        Ok(())
    }
}

impl Resolver for Vault {
    fn resolve(&self, path: &str, note: &Path) -> Option<PathBuf> {
        if path.trim().is_empty() {
            return None;
        }
        let candidate = Path::new(path);

        // Absolute paths come from file URLs and may live outside the vault
        if candidate.is_absolute() || has_drive_prefix(path) {
            return candidate.is_file().then(|| candidate.to_path_buf());
        }

        let note_dir = self
            .locate(note)
            .ok()
            .and_then(|n| n.parent().map(Path::to_path_buf));

        let resolved = note_dir
            .and_then(|dir| self.existing_inside(dir.join(candidate)))
            .or_else(|| self.existing_inside(self.root.join(candidate)))
            .or_else(|| self.find_by_name(candidate));

        if resolved.is_none() {
            debug!(path, note = %note.display(), "embed did not resolve");
        }
        resolved
    }
}

/// Whether a path names a markdown note.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

/// Resolve `.` and `..` without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Vault) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("trips/2024")).unwrap();
        fs::create_dir_all(root.join("attachments")).unwrap();
        fs::create_dir_all(root.join(".obsidian")).unwrap();

        fs::write(root.join("Home.md"), "![[cover.png]]").unwrap();
        fs::write(root.join("about.md"), "no images").unwrap();
        fs::write(root.join("readme.txt"), "not a note").unwrap();
        fs::write(root.join(".hidden.md"), "hidden").unwrap();
        fs::write(root.join("trips/paris.md"), "![](eiffel.jpg)").unwrap();
        fs::write(root.join("trips/eiffel.jpg"), b"jpg").unwrap();
        fs::write(root.join("attachments/cover.png"), b"png").unwrap();
        fs::write(root.join("trips/2024/cover.png"), b"png").unwrap();
        fs::write(root.join(".obsidian/secret.png"), b"png").unwrap();

        let vault = Vault::open(root).unwrap();
        (dir, vault)
    }

    #[test]
    fn test_open_rejects_file() {
        let (_dir, vault) = fixture();
        let err = Vault::open(vault.root().join("about.md")).unwrap_err();
        assert!(matches!(err, VaultError::NotADirectory(_)));

        let err = Vault::open(vault.root().join("missing")).unwrap_err();
        assert!(matches!(err, VaultError::NotFound(_)));
    }

    #[test]
    fn test_list_folder_order() {
        let (_dir, vault) = fixture();
        let entries = vault.list_folder(Path::new("")).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name()).collect();

        assert_eq!(names, vec!["attachments", "trips", "about", "Home"]);
        assert!(entries[0].is_folder());
        assert!(!entries[2].is_folder());
    }

    #[test]
    fn test_list_subfolder() {
        let (_dir, vault) = fixture();
        let entries = vault.list_folder(&vault.root().join("trips")).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name()).collect();

        assert_eq!(names, vec!["2024", "paris"]);
    }

    #[test]
    fn test_locate_rejects_escape() {
        let (_dir, vault) = fixture();
        let err = vault.locate(Path::new("../outside.md")).unwrap_err();
        assert!(matches!(err, VaultError::OutsideVault(_)));

        let inside = vault.locate(Path::new("trips/../about.md")).unwrap();
        assert_eq!(inside, vault.root().join("about.md"));
    }

    #[test]
    fn test_resolve_relative_to_note() {
        let (_dir, vault) = fixture();
        let note = vault.root().join("trips/paris.md");

        assert_eq!(
            vault.resolve("eiffel.jpg", &note),
            Some(vault.root().join("trips/eiffel.jpg"))
        );
    }

    #[test]
    fn test_resolve_relative_to_root() {
        let (_dir, vault) = fixture();
        let note = vault.root().join("trips/paris.md");

        assert_eq!(
            vault.resolve("attachments/cover.png", &note),
            Some(vault.root().join("attachments/cover.png"))
        );
    }

    #[test]
    fn test_resolve_by_name_prefers_shortest_path() {
        let (_dir, vault) = fixture();
        let note = vault.root().join("Home.md");

        assert_eq!(
            vault.resolve("cover.png", &note),
            Some(vault.root().join("attachments/cover.png"))
        );
    }

    #[test]
    fn test_resolve_skips_hidden_and_missing() {
        let (_dir, vault) = fixture();
        let note = vault.root().join("Home.md");

        assert_eq!(vault.resolve("secret.png", &note), None);
        assert_eq!(vault.resolve("nowhere.png", &note), None);
        assert_eq!(vault.resolve("", &note), None);
    }

    #[test]
    fn test_resolve_by_name_walks_nested_folders() {
        let (dir, vault) = fixture();
        fs::create_dir_all(dir.path().join("trips/2024/deep/er")).unwrap();
        fs::create_dir_all(dir.path().join("trips/.trash")).unwrap();
        fs::write(dir.path().join("trips/2024/deep/er/far.jpg"), b"jpg").unwrap();
        fs::write(dir.path().join("trips/.trash/gone.jpg"), b"jpg").unwrap();
        let note = vault.root().join("Home.md");

        assert_eq!(
            vault.resolve("far.jpg", &note),
            Some(vault.root().join("trips/2024/deep/er/far.jpg"))
        );
        assert_eq!(vault.resolve("gone.jpg", &note), None);
    }

    #[test]
    fn test_resolve_absolute_path() {
        let (_dir, vault) = fixture();
        let note = vault.root().join("Home.md");
        let absolute = vault.root().join("trips/eiffel.jpg");

        assert_eq!(
            vault.resolve(&absolute.to_string_lossy(), &note),
            Some(absolute)
        );
    }

    #[test]
    fn test_resolve_escape_falls_back_to_name() {
        let (_dir, vault) = fixture();
        let note = vault.root().join("Home.md");

        // ../ leaves the vault, so only the by-name lookup applies
        assert_eq!(
            vault.resolve("../../eiffel.jpg", &note),
            Some(vault.root().join("trips/eiffel.jpg"))
        );
    }

    #[test]
    fn test_read_write_round_trip() {
        let (_dir, vault) = fixture();
        let note = vault.root().join("about.md");

        vault.write(&note, "new text\n").unwrap();
        assert_eq!(vault.read(&note).unwrap(), "new text\n");
    }

    #[test]
    fn test_read_missing_note() {
        let (_dir, vault) = fixture();
        let err = vault.read(Path::new("nope.md")).unwrap_err();
        assert!(matches!(err, VaultError::NotFound(_)));
    }

    #[test]
    fn test_write_if_unchanged_rejects_stale() {
        let (_dir, vault) = fixture();
        let note = vault.root().join("about.md");
        let snapshot = vault.read(&note).unwrap();

        fs::write(&note, "edited elsewhere").unwrap();

        let err = vault
            .write_if_unchanged(&note, &snapshot, "mine")
            .unwrap_err();
        assert!(matches!(err, VaultError::StaleNote(_)));
        assert_eq!(vault.read(&note).unwrap(), "edited elsewhere");

        vault
            .write_if_unchanged(&note, "edited elsewhere", "mine")
            .unwrap();
        assert_eq!(vault.read(&note).unwrap(), "mine");
    }
}
