use crate::board::{Card, FolderStack, load_board};
use crate::config::Config;
use crate::error::VaultError;
use crate::keybindings::{Action, KeybindingMode, Keybindings};
use crate::media::Direction;
use crate::picker::PickerSession;
use crate::tui::help_text;
use crate::tui::image_cache::ImageCache;
use crate::vault::Vault;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Card size step for `CardSizeIncrease` / `CardSizeDecrease`
const CARD_WIDTH_STEP: u16 = 4;
const CARD_HEIGHT_STEP: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMode {
    Board,
    Picker,
    Help,
}

impl AppMode {
    pub fn keybinding_mode(self) -> KeybindingMode {
        match self {
            AppMode::Board => KeybindingMode::Board,
            AppMode::Picker => KeybindingMode::Picker,
            AppMode::Help => KeybindingMode::Help,
        }
    }
}

pub struct App {
    pub vault: Vault,
    pub folders: FolderStack,
    pub cards: Vec<Card>,
    pub selected: usize,
    /// Cards per row, updated by the renderer from the terminal width
    pub columns: usize,
    /// First visible row of the grid
    pub scroll_row: usize,
    pub mode: AppMode,
    pub picker: Option<PickerSession>,
    pub status_message: Option<String>, // Temporary status message to display
    pub help_scroll: u16,
    pub images_enabled: bool,
    pub image_cache: ImageCache,

    /// Note waiting to be opened in `$EDITOR` by the event loop
    pub pending_editor_file: Option<PathBuf>,
    /// Set after the app writes to the vault so the watcher skips its own change
    pub suppress_file_watch: bool,
    pub should_quit: bool,

    pub keybindings: Keybindings,
    pub config: Config,
}

impl App {
    /// Create the app on the vault root and load its board.
    pub fn new(vault: Vault, config: Config, images_enabled: bool) -> crate::error::Result<Self> {
        let folders = FolderStack::new(vault.root());
        let keybindings = config.keybindings();

        let mut app = Self {
            vault,
            folders,
            cards: Vec::new(),
            selected: 0,
            columns: 1,
            scroll_row: 0,
            mode: AppMode::Board,
            picker: None,
            status_message: None,
            help_scroll: 0,
            images_enabled,
            image_cache: ImageCache::new(),
            pending_editor_file: None,
            suppress_file_watch: false,
            should_quit: false,
            keybindings,
            config,
        };
        app.reload()?;
        Ok(app)
    }

    /// Reload the current folder from disk, keeping the selection in range.
    pub fn reload(&mut self) -> crate::error::Result<()> {
        self.cards = load_board(
            &self.vault,
            self.folders.current(),
            self.config.board.show_videos,
        )?;
        self.selected = self.selected.min(self.cards.len().saturating_sub(1));
        debug!(folder = %self.folders.current().display(), cards = self.cards.len(), "board loaded");
        Ok(())
    }

    /// Reload after an external change, reporting failures in the status bar.
    pub fn reload_after_change(&mut self) {
        // The current folder may have been deleted
        while !self.folders.current().is_dir() && self.folders.pop() {}

        match self.reload() {
            Ok(()) => self.status_message = Some("↻ Board reloaded (external change)".to_string()),
            Err(e) => self.status_message = Some(format!("✗ Reload failed: {}", e)),
        }
    }

    pub fn selected_card(&self) -> Option<&Card> {
        self.cards.get(self.selected)
    }

    /// Title bar text: vault name followed by the folders walked into
    pub fn breadcrumb(&self) -> String {
        let mut parts = self.folders.breadcrumb();
        if let Some(first) = parts.first_mut() {
            *first = self.vault.name();
        }
        parts.join(" / ")
    }

    /// Run one bound action.
    pub fn handle_action(&mut self, action: Action) {
        let before = self.mode;

        match action {
            Action::Next => self.next(),
            Action::Previous => self.previous(),
            Action::Up => self.up(),
            Action::Down => self.down(),
            Action::First => self.first(),
            Action::Last => self.last(),

            Action::Open => self.open_selected(),
            Action::Back => self.go_back(),
            Action::OpenExternal => self.open_external(),
            Action::Refresh => match self.reload() {
                Ok(()) => self.status_message = Some("✓ Reloaded".to_string()),
                Err(e) => self.status_message = Some(format!("✗ Reload failed: {}", e)),
            },

            Action::OpenPicker => self.open_picker(),
            Action::PickerNext => self.picker_navigate(Direction::Next),
            Action::PickerPrevious => self.picker_navigate(Direction::Previous),
            Action::PickerCommit => self.commit_picker(),
            Action::ClosePicker => self.close_picker(),

            Action::CardSizeIncrease => {
                self.resize_cards(CARD_WIDTH_STEP as i32, CARD_HEIGHT_STEP as i32)
            }
            Action::CardSizeDecrease => {
                self.resize_cards(-(CARD_WIDTH_STEP as i32), -(CARD_HEIGHT_STEP as i32))
            }
            Action::ToggleImages => self.toggle_images(),
            Action::ToggleHelp => self.toggle_help(),
            Action::HelpScrollDown => self.scroll_help_down(),
            Action::HelpScrollUp => self.scroll_help_up(),

            Action::Quit => self.should_quit = true,
        }

        if self.mode != before {
            self.keybindings.reset_sequences();
        }
    }

    // Grid navigation

    pub fn next(&mut self) {
        if self.selected + 1 < self.cards.len() {
            self.selected += 1;
        }
    }

    pub fn previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn up(&mut self) {
        let columns = self.columns.max(1);
        if self.selected >= columns {
            self.selected -= columns;
        }
    }

    /// Move one row down. From a short last row's missing column, land on the
    /// last card instead of staying put.
    pub fn down(&mut self) {
        let columns = self.columns.max(1);
        if self.cards.is_empty() {
            return;
        }
        let last = self.cards.len() - 1;
        if self.selected + columns <= last {
            self.selected += columns;
        } else if last / columns > self.selected / columns {
            self.selected = last;
        }
    }

    pub fn first(&mut self) {
        self.selected = 0;
    }

    pub fn last(&mut self) {
        self.selected = self.cards.len().saturating_sub(1);
    }

    /// Keep the selected row inside a viewport of `visible_rows` rows.
    pub fn ensure_visible(&mut self, visible_rows: usize) {
        let visible_rows = visible_rows.max(1);
        let row = self.selected / self.columns.max(1);
        if row < self.scroll_row {
            self.scroll_row = row;
        } else if row >= self.scroll_row + visible_rows {
            self.scroll_row = row + 1 - visible_rows;
        }
    }

    // Folders and notes

    /// Enter the selected folder, or open the selected note.
    pub fn open_selected(&mut self) {
        let Some(card) = self.selected_card() else {
            return;
        };
        let path = card.entry.path().to_path_buf();

        if card.is_folder() {
            self.enter_folder(path);
        } else if self.config.board.open_in_terminal_editor {
            self.pending_editor_file = Some(path);
        } else {
            self.open_with_system(&path);
        }
    }

    fn enter_folder(&mut self, folder: PathBuf) {
        self.folders.push(folder);
        self.selected = 0;
        self.scroll_row = 0;
        if let Err(e) = self.reload() {
            self.folders.pop();
            self.status_message = Some(format!("✗ Cannot open folder: {}", e));
            let _ = self.reload();
        }
    }

    /// Return to the parent folder and select the folder we came from.
    pub fn go_back(&mut self) {
        let left = self.folders.current().to_path_buf();
        if !self.folders.pop() {
            self.status_message = Some("Already at the vault root".to_string());
            return;
        }

        self.selected = 0;
        self.scroll_row = 0;
        match self.reload() {
            Ok(()) => {
                if let Some(index) = self.cards.iter().position(|c| c.entry.path() == left) {
                    self.selected = index;
                }
            }
            Err(e) => self.status_message = Some(format!("✗ Reload failed: {}", e)),
        }
    }

    /// Open the selected card's thumbnail, or the note itself, with the system handler.
    pub fn open_external(&mut self) {
        let Some(card) = self.selected_card() else {
            return;
        };
        let path = card
            .thumbnail
            .as_ref()
            .map(|t| t.path.clone())
            .unwrap_or_else(|| card.entry.path().to_path_buf());
        self.open_with_system(&path);
    }

    fn open_with_system(&mut self, path: &Path) {
        let name = display_name(path);
        match open::that(path) {
            Ok(()) => self.status_message = Some(format!("✓ Opened {}", name)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "system opener failed");
                self.status_message = Some(format!("✗ Failed to open {}: {}", name, e));
            }
        }
    }

    // Thumbnail picker

    pub fn open_picker(&mut self) {
        let Some(card) = self.selected_card() else {
            return;
        };
        if card.is_folder() {
            self.status_message = Some("Folders have no thumbnail to pick".to_string());
            return;
        }

        match PickerSession::open(&self.vault, card.entry.path()) {
            Ok(session) => {
                self.picker = Some(session);
                self.mode = AppMode::Picker;
            }
            Err(e) => self.status_message = Some(format!("✗ Cannot read note: {}", e)),
        }
    }

    pub fn picker_navigate(&mut self, direction: Direction) {
        if let Some(picker) = self.picker.as_mut() {
            picker.navigate(direction);
        }
    }

    /// Make the image under the cursor the note's thumbnail, then close the picker.
    pub fn commit_picker(&mut self) {
        let Some(picker) = self.picker.take() else {
            return;
        };
        self.mode = AppMode::Board;

        let name = picker.note_name();
        let chosen = picker.current().map(|r| r.path.clone());

        match picker.commit(&self.vault) {
            Ok(Some(_)) => {
                self.suppress_file_watch = true;
                if let Err(e) = self.reload() {
                    self.status_message = Some(format!("✗ Reload failed: {}", e));
                    return;
                }
                self.status_message = Some(format!(
                    "✓ Thumbnail of {} set to {}",
                    name,
                    chosen.unwrap_or_default()
                ));
            }
            Ok(None) => {}
            Err(VaultError::StaleNote(_)) => {
                self.status_message = Some(format!(
                    "✗ {} changed on disk; reopen the picker to try again",
                    name
                ));
                let _ = self.reload();
            }
            Err(e) => {
                self.status_message = Some(format!("✗ Failed to save {}: {}", name, e));
            }
        }
    }

    pub fn close_picker(&mut self) {
        self.picker = None;
        self.mode = AppMode::Board;
    }

    // View

    fn resize_cards(&mut self, dw: i32, dh: i32) {
        let width = (self.config.board.card_width as i32 + dw).max(0) as u16;
        let height = (self.config.board.card_height as i32 + dh).max(0) as u16;

        let result = self.config.set_card_size(width, height);
        let (width, height) = (self.config.board.card_width, self.config.board.card_height);
        self.status_message = Some(match result {
            Ok(()) => format!("✓ Card size {}×{}", width, height),
            Err(e) => format!("✗ Card size {}×{} (not saved: {})", width, height, e),
        });
    }

    pub fn toggle_images(&mut self) {
        self.images_enabled = !self.images_enabled;
        if !self.images_enabled {
            self.image_cache.clear();
        }

        let state = if self.images_enabled { "on" } else { "off" };
        self.status_message = Some(match self.config.set_images_enabled(self.images_enabled) {
            Ok(()) => format!("✓ Thumbnails {}", state),
            Err(e) => format!("✗ Thumbnails {} (not saved: {})", state, e),
        });
    }

    pub fn toggle_help(&mut self) {
        if self.mode == AppMode::Help {
            self.mode = AppMode::Board;
        } else {
            self.mode = AppMode::Help;
            self.help_scroll = 0; // Reset scroll when opening help
        }
    }

    pub fn scroll_help_down(&mut self) {
        let new_scroll = self.help_scroll.saturating_add(1);
        let max_scroll = help_text::help_line_count(&self.keybindings) as u16;
        if new_scroll < max_scroll {
            self.help_scroll = new_scroll;
        }
    }

    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }
}

/// File name of a path, for status messages
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Vault with one folder and five notes
    fn fixture() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("trips")).unwrap();
        fs::write(root.join("trips/rome.md"), "![[colosseum.jpg]]").unwrap();
        fs::write(root.join("trips/colosseum.jpg"), b"jpg").unwrap();
        for name in ["a", "b", "c", "d"] {
            fs::write(root.join(format!("{}.md", name)), "text").unwrap();
        }
        fs::write(root.join("cover.png"), b"png").unwrap();
        fs::write(root.join("pics.md"), "intro ![[cover.png]] ![](cover.png)").unwrap();

        let vault = Vault::open(root).unwrap();
        let app = App::new(vault, Config::default(), false).unwrap();
        (dir, app)
    }

    fn titles(app: &App) -> Vec<&str> {
        app.cards.iter().map(|c| c.title()).collect()
    }

    #[test]
    fn test_board_loads_root() {
        let (_dir, app) = fixture();
        assert_eq!(titles(&app), vec!["trips", "a", "b", "c", "d", "pics"]);
        assert_eq!(app.selected, 0);
        assert_eq!(app.mode, AppMode::Board);
    }

    #[test]
    fn test_grid_navigation() {
        let (_dir, mut app) = fixture();
        app.columns = 4;

        app.handle_action(Action::Down);
        assert_eq!(app.selected, 4);
        app.handle_action(Action::Down);
        assert_eq!(app.selected, 4);
        app.handle_action(Action::Next);
        app.handle_action(Action::Next);
        assert_eq!(app.selected, 5);
        app.handle_action(Action::Up);
        assert_eq!(app.selected, 1);
        app.handle_action(Action::Previous);
        app.handle_action(Action::Previous);
        assert_eq!(app.selected, 0);
        app.handle_action(Action::Last);
        assert_eq!(app.selected, 5);
        app.handle_action(Action::First);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_down_from_short_row_lands_on_last() {
        let (_dir, mut app) = fixture();
        app.columns = 4;
        app.selected = 3;

        app.down();
        assert_eq!(app.selected, 5);
    }

    #[test]
    fn test_ensure_visible() {
        let (_dir, mut app) = fixture();
        app.columns = 1;
        app.selected = 5;

        app.ensure_visible(2);
        assert_eq!(app.scroll_row, 4);
        app.selected = 1;
        app.ensure_visible(2);
        assert_eq!(app.scroll_row, 1);
    }

    #[test]
    fn test_enter_folder_and_back() {
        let (_dir, mut app) = fixture();

        app.handle_action(Action::Open);
        assert_eq!(titles(&app), vec!["rome"]);
        assert!(app.breadcrumb().ends_with(" / trips"));
        assert!(app.cards[0].thumbnail.is_some());

        app.handle_action(Action::Back);
        assert_eq!(app.selected, 0);
        assert_eq!(app.cards[app.selected].title(), "trips");

        app.handle_action(Action::Back);
        assert_eq!(app.status_message.as_deref(), Some("Already at the vault root"));
    }

    #[test]
    fn test_open_note_in_terminal_editor() {
        let (_dir, mut app) = fixture();
        app.config.board.open_in_terminal_editor = true;
        app.selected = 1;

        app.handle_action(Action::Open);
        assert_eq!(
            app.pending_editor_file.as_deref(),
            Some(app.vault.root().join("a.md").as_path())
        );
    }

    #[test]
    fn test_picker_on_folder_is_refused() {
        let (_dir, mut app) = fixture();

        app.handle_action(Action::OpenPicker);
        assert_eq!(app.mode, AppMode::Board);
        assert!(app.picker.is_none());
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_picker_commit_rewrites_note() {
        let (_dir, mut app) = fixture();
        app.handle_action(Action::Last);

        app.handle_action(Action::OpenPicker);
        assert_eq!(app.mode, AppMode::Picker);
        assert_eq!(app.picker.as_ref().and_then(|p| p.position()), Some((1, 2)));

        app.handle_action(Action::PickerNext);
        app.handle_action(Action::PickerCommit);

        assert_eq!(app.mode, AppMode::Board);
        assert!(app.picker.is_none());
        assert!(app.suppress_file_watch);
        let text = fs::read_to_string(app.vault.root().join("pics.md")).unwrap();
        assert_eq!(text, "![[cover.png]]\n\nintro ![[cover.png]] ");
        assert!(app.status_message.as_deref().unwrap().starts_with('✓'));
    }

    #[test]
    fn test_picker_commit_refuses_stale_note() {
        let (_dir, mut app) = fixture();
        app.handle_action(Action::Last);
        app.handle_action(Action::OpenPicker);

        let note = app.vault.root().join("pics.md");
        fs::write(&note, "edited elsewhere ![[cover.png]]").unwrap();
        app.handle_action(Action::PickerCommit);

        assert_eq!(fs::read_to_string(&note).unwrap(), "edited elsewhere ![[cover.png]]");
        assert!(app.status_message.as_deref().unwrap().starts_with('✗'));
    }

    #[test]
    fn test_close_picker_leaves_note_alone() {
        let (_dir, mut app) = fixture();
        app.handle_action(Action::Last);
        app.handle_action(Action::OpenPicker);
        app.handle_action(Action::ClosePicker);

        assert_eq!(app.mode, AppMode::Board);
        assert!(app.picker.is_none());
        let text = fs::read_to_string(app.vault.root().join("pics.md")).unwrap();
        assert_eq!(text, "intro ![[cover.png]] ![](cover.png)");
    }

    #[test]
    fn test_help_toggle_and_scroll() {
        let (_dir, mut app) = fixture();

        app.handle_action(Action::ToggleHelp);
        assert_eq!(app.mode, AppMode::Help);
        app.handle_action(Action::HelpScrollDown);
        assert_eq!(app.help_scroll, 1);
        app.handle_action(Action::HelpScrollUp);
        app.handle_action(Action::HelpScrollUp);
        assert_eq!(app.help_scroll, 0);
        app.handle_action(Action::ToggleHelp);
        assert_eq!(app.mode, AppMode::Board);
    }

    #[test]
    fn test_reload_after_folder_removed() {
        let (dir, mut app) = fixture();
        app.handle_action(Action::Open);
        fs::remove_dir_all(dir.path().join("trips")).unwrap();

        app.reload_after_change();
        assert_eq!(app.folders.depth(), 1);
        assert_eq!(titles(&app), vec!["a", "b", "c", "d", "pics"]);
    }

    #[test]
    fn test_quit() {
        let (_dir, mut app) = fixture();
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }
}
