//! # cardboard
//!
//! A card board for markdown vaults, with thumbnails taken from the images a
//! note embeds.
//!
//! This library provides the pieces behind the `cardboard` binary: scanning
//! notes for embedded media, choosing and committing thumbnails, reading and
//! writing notes in a vault folder, and the interactive board itself.
//!
//! ## Features
//!
//! - Find `![[wikilink]]` and `![alt](markdown)` image and video embeds
//! - Browse a note's images and move the chosen one to the top of the note
//! - Resolve embed paths against the vault the way note apps do
//! - Interactive TUI board with image thumbnails
//!
//! ## Example
//!
//! ```rust
//! use cardboard::media::{Direction, ScanMode, SelectionState, scan};
//!
//! let note = "Trip notes ![[beach.png]] and ![](file:///C:/pics/hotel.jpg)";
//!
//! let mut selection = SelectionState::new(scan(note, ScanMode::Picker));
//! selection.navigate(Direction::Next);
//!
//! let updated = selection.commit(note).unwrap();
//! assert_eq!(
//!     updated,
//!     "![](file:///C:/pics/hotel.jpg)\n\nTrip notes ![[beach.png]] and "
//! );
//! ```

/// Board model: cards, thumbnails and the folder stack.
pub mod board;

/// Configuration module for persisting user preferences.
///
/// Provides configuration management for card size, thumbnails, colors,
/// keybindings and the default vault.
pub mod config;

/// Error types shared by the vault, board and picker.
pub mod error;

/// Keybindings module for customizable keyboard shortcuts.
///
/// Provides a flexible keybinding system that allows users to customize
/// keyboard shortcuts via configuration files.
pub mod keybindings;

/// Log file and stderr logging setup.
pub mod logging;

/// Embedded media scanning and thumbnail selection.
pub mod media;

/// Thumbnail picker session for one note.
pub mod picker;

/// TUI module for the interactive board.
pub mod tui;

/// Filesystem vault: note storage and embed resolution.
pub mod vault;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::{Result, VaultError};
pub use media::{MediaKind, MediaReference, ScanMode, scan};
pub use tui::App;
pub use vault::{Resolver, TextStore, Vault};
