//! Embedded media detection in markdown notes.
//!
//! This module finds the images and videos a note embeds, in the order they
//! appear, so the board can pick a thumbnail and the picker can offer the
//! alternatives. Two embedding syntaxes are recognized:
//!
//! - Wikilink embeds: `![[photo.png]]` (also `[[photo.png]]`, and
//!   `![[photo.png|300]]` where the part after `|` is a size or alias)
//! - Markdown images: `![alt text](photo.png)`, optionally with a title or
//!   an angle-bracketed path
//!
//! Scanning is pure text extraction. Whether a path actually exists in the
//! vault is decided later by a [`Resolver`](crate::vault::Resolver).

pub mod selector;

pub use selector::{Direction, SelectionPhase, SelectionState, commit};

use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;

/// Image extensions accepted as thumbnails.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];

/// Video extensions accepted as thumbnails on the board.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm"];

/// What kind of media a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a path by its (case-insensitive) file extension.
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// Which embedding syntax a reference was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSyntax {
    /// `![[path]]`
    WikiLink,
    /// `![alt](path)`
    MarkdownLink,
}

/// Which media kinds a scan keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Images and videos: anything that can stand in as a card thumbnail.
    #[default]
    Thumbnail,
    /// Images only, as offered by the thumbnail picker.
    Picker,
}

impl ScanMode {
    fn accepts(self, kind: MediaKind) -> bool {
        match self {
            ScanMode::Thumbnail => true,
            ScanMode::Picker => kind == MediaKind::Image,
        }
    }
}

/// One embedded image or video found in a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaReference {
    /// The exact substring of the note that embeds the media
    pub raw_match: String,
    /// The path as written inside the embed, before normalization
    pub target: String,
    /// Normalized path (file URLs decoded and stripped, forward slashes)
    pub path: String,
    pub kind: MediaKind,
    pub syntax: LinkSyntax,
    /// Byte offset of `raw_match` in the scanned text
    #[serde(skip)]
    pub offset: usize,
}

impl MediaReference {
    /// Whether the reference was written as a `file://` URL.
    pub fn is_file_url(&self) -> bool {
        strip_file_scheme(&self.target).is_some()
    }

    /// The form this reference takes when it is moved to the top of a note.
    ///
    /// File URLs keep their original target in markdown image syntax with an
    /// empty alt text; every other path becomes a wikilink embed. Paths with
    /// `|`, `[` or `]` cannot be written inside `[[...]]` and also keep the
    /// markdown form.
    pub fn canonical(&self) -> String {
        if self.is_file_url() || self.path.contains(['|', '[', ']']) {
            format!("![]({})", self.target)
        } else {
            format!("![[{}]]", self.path)
        }
    }
}

fn embed_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"!?\[\[([^\[\]\n]+?)\]\]|!\[([^\]\n]*)\]\(([^)\n]+)\)").unwrap()
    })
}

/// Scan note text for embedded media.
///
/// References are returned in order of appearance. Identical paths are not
/// deduplicated. Text without any recognizable embed yields an empty vector.
///
/// # Arguments
///
/// * `text` - Raw markdown content of the note
/// * `mode` - Whether videos are kept alongside images
pub fn scan(text: &str, mode: ScanMode) -> Vec<MediaReference> {
    embed_pattern()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let (target, syntax) = match caps.get(1) {
                Some(inner) => (wikilink_target(inner.as_str()), LinkSyntax::WikiLink),
                None => (
                    markdown_target(caps.get(3)?.as_str()),
                    LinkSyntax::MarkdownLink,
                ),
            };
            if target.is_empty() {
                return None;
            }

            let path = normalize_path(target);
            let kind = MediaKind::from_path(&path)?;
            if !mode.accepts(kind) {
                return None;
            }

            Some(MediaReference {
                raw_match: whole.as_str().to_string(),
                target: target.to_string(),
                path,
                kind,
                syntax,
                offset: whole.start(),
            })
        })
        .collect()
}

/// The first embedded media reference of a note, if any.
pub fn first_reference(text: &str, mode: ScanMode) -> Option<MediaReference> {
    scan(text, mode).into_iter().next()
}

/// Strip an Obsidian alias or size suffix: `photo.png|300` -> `photo.png`.
fn wikilink_target(inner: &str) -> &str {
    inner.split('|').next().unwrap_or(inner).trim()
}

/// Strip a title and angle brackets: `<my photo.png> "Title"` -> `my photo.png`.
fn markdown_target(inner: &str) -> &str {
    let inner = inner.trim();

    if let Some(rest) = inner.strip_prefix('<') {
        if let Some(end) = rest.find('>') {
            return rest[..end].trim();
        }
    }

    for quote in [" \"", " '"] {
        if let Some(idx) = inner.find(quote) {
            return inner[..idx].trim();
        }
    }

    inner
}

/// Normalize an embed target into a plain location string.
///
/// Only `file:` URLs are touched: they are percent-decoded, the scheme and
/// its two or three slashes are removed, and backslashes become forward
/// slashes. A POSIX absolute path keeps its leading slash, a Windows drive
/// path loses the slash in front of the drive letter.
///
/// ```
/// use cardboard::media::normalize_path;
///
/// assert_eq!(normalize_path(r"file:///C:\a\b.png"), "C:/a/b.png");
/// assert_eq!(normalize_path("file:///home/me/a%20b.png"), "/home/me/a b.png");
/// assert_eq!(normalize_path("assets/pic.png"), "assets/pic.png");
/// ```
pub fn normalize_path(target: &str) -> String {
    if strip_file_scheme(target).is_none() {
        return target.to_string();
    }

    let decoded = urlencoding::decode(target)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| target.to_string());

    let stripped = strip_file_scheme(&decoded).unwrap_or(&decoded);
    stripped.replace('\\', "/")
}

/// Return what follows `file://` (case-insensitive), dropping a third slash
/// when it precedes a drive letter.
fn strip_file_scheme(target: &str) -> Option<&str> {
    let scheme = target.get(..7)?;
    if !scheme.eq_ignore_ascii_case("file://") {
        return None;
    }

    let rest = &target[7..];
    match rest.strip_prefix('/') {
        Some(after) if starts_with_drive(after) => Some(after),
        _ => Some(rest),
    }
}

fn starts_with_drive(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
