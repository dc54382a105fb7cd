//! Thumbnail selection over the media references of one note.
//!
//! A [`SelectionState`] is either empty (the note embeds nothing usable) or
//! browsing one of its references. Navigation wraps around in both
//! directions. Committing a selection produces new note text with the chosen
//! embed moved to the very top, which makes it the note's thumbnail.

use super::{MediaReference, ScanMode, scan};
use crate::vault::Resolver;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Direction of a picker step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Observable state of a [`SelectionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    /// No references: nothing to show or commit
    Empty,
    /// Browsing the reference at this index
    Browsing(usize),
}

/// The references of one note plus the one currently under the cursor.
///
/// The index is private so it can never point outside the references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    references: Vec<MediaReference>,
    current: usize,
}

impl SelectionState {
    /// Start a selection at the first reference.
    pub fn new(references: Vec<MediaReference>) -> Self {
        Self {
            references,
            current: 0,
        }
    }

    /// Rebuild the selection from fresh note text.
    ///
    /// The cursor returns to the first reference; the state becomes empty
    /// when the text no longer embeds anything.
    pub fn rescan(&mut self, text: &str, mode: ScanMode) {
        *self = Self::new(scan(text, mode));
    }

    pub fn phase(&self) -> SelectionPhase {
        if self.references.is_empty() {
            SelectionPhase::Empty
        } else {
            SelectionPhase::Browsing(self.current)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn references(&self) -> &[MediaReference] {
        &self.references
    }

    /// Index under the cursor, `None` when empty.
    pub fn current_index(&self) -> Option<usize> {
        match self.phase() {
            SelectionPhase::Empty => None,
            SelectionPhase::Browsing(index) => Some(index),
        }
    }

    /// Reference under the cursor, `None` when empty.
    pub fn current(&self) -> Option<&MediaReference> {
        self.references.get(self.current)
    }

    /// Move the cursor one step, wrapping at both ends. No-op when empty.
    pub fn navigate(&mut self, direction: Direction) {
        let n = self.references.len();
        if n == 0 {
            return;
        }
        self.current = match direction {
            Direction::Next => (self.current + 1) % n,
            Direction::Previous => (self.current + n - 1) % n,
        };
    }

    /// Resolve the reference under the cursor to a displayable file.
    ///
    /// Returns `None` when the selection is empty or the path does not
    /// resolve; callers show a "no images" state in both cases.
    pub fn current_display_target<R>(&self, resolver: &R, note: &Path) -> Option<PathBuf>
    where
        R: Resolver + ?Sized,
    {
        let reference = self.current()?;
        resolver.resolve(&reference.path, note)
    }

    /// Rewrite `text` so the reference under the cursor comes first.
    ///
    /// Returns `None` when there is nothing to commit.
    pub fn commit(&self, text: &str) -> Option<String> {
        self.current().map(|reference| move_to_top(text, reference))
    }
}

/// Rewrite `text` so that `references[index]` becomes the first embed.
///
/// The reference's own embed text is removed and its canonical form is
/// prepended, followed by a blank line. Nothing else in the text changes. If
/// the embed text no longer occurs, only the prepend happens.
///
/// # Panics
///
/// Panics if `index` is out of bounds for `references`.
pub fn commit(text: &str, references: &[MediaReference], index: usize) -> String {
    move_to_top(text, &references[index])
}

fn move_to_top(text: &str, reference: &MediaReference) -> String {
    let body = match embed_range(text, reference) {
        Some(range) => [&text[..range.start], &text[range.end..]].concat(),
        None => text.to_string(),
    };
    format!("{}\n\n{}", reference.canonical(), body)
}

/// Byte range of the reference's embed in `text`.
///
/// Uses the scanned offset while the text still holds the embed there.
/// Otherwise the first literal occurrence that is a whole embed wins: a bare
/// `[[path]]` never matches the tail of a `![[path]]`.
fn embed_range(text: &str, reference: &MediaReference) -> Option<Range<usize>> {
    let raw = reference.raw_match.as_str();
    if raw.is_empty() {
        return None;
    }

    let bare = raw.starts_with("[[");
    let whole_embed = |i: usize| !(bare && text[..i].ends_with('!'));

    let start = reference.offset;
    if text.get(start..).is_some_and(|rest| rest.starts_with(raw)) && whole_embed(start) {
        return Some(start..start + raw.len());
    }

    text.match_indices(raw)
        .map(|(i, _)| i)
        .find(|&i| whole_embed(i))
        .map(|i| i..i + raw.len())
}
