mod app;
mod help_text;
mod image_cache;
mod ui;
mod watcher;

pub use app::{App, AppMode};
pub use image_cache::{ImageCache, ImageError};

use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::DefaultTerminal;
use std::io::stdout;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Suspend the TUI, run an external editor, then restore the TUI
fn run_editor(terminal: &mut DefaultTerminal, file_path: &Path) -> Result<()> {
    // Leave alternate screen and disable raw mode to give editor full terminal control
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;

    // Blocks until the editor ($VISUAL, then $EDITOR) closes
    let result = opensesame::Editor::open(file_path);

    // Restore terminal state
    stdout().execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    terminal.clear()?;

    result.map_err(|e| eyre!("{}", e))
}

/// Run the TUI application.
///
/// Processes keyboard events and renders the board until the user quits.
/// The vault is watched so external edits show up without a manual refresh.
pub fn run(terminal: &mut DefaultTerminal, app: App) -> Result<()> {
    let mut app = app;

    if app.images_enabled {
        if let Err(e) = app.image_cache.initialize() {
            warn!(error = %e, "image rendering unavailable");
            app.status_message = Some(format!("✗ Thumbnails unavailable: {}", e));
        }
    }

    let mut vault_watcher = match watcher::VaultWatcher::new(app.vault.root()) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!(error = %e, "live reload disabled");
            None
        }
    };

    info!(vault = %app.vault.root().display(), "board opened");

    loop {
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        if app.should_quit {
            return Ok(());
        }

        // Notes opened in the terminal editor
        if let Some(file_path) = app.pending_editor_file.take() {
            let filename = app::display_name(&file_path);
            match run_editor(terminal, &file_path) {
                Ok(()) => {
                    app.status_message = Some(format!("✓ Edited {}", filename));
                    if let Err(e) = app.reload() {
                        app.status_message = Some(format!("✗ Reload failed: {}", e));
                    }
                    app.image_cache.clear();
                }
                Err(e) => {
                    app.status_message = Some(format!("✗ Failed to edit {}: {}", filename, e));
                }
            }
            // The editor's own writes are already reflected
            if let Some(ref mut watcher) = vault_watcher {
                watcher.drain();
            }
            continue; // Redraw after returning from editor
        }

        // Poll for events with timeout so file changes are picked up
        if !event::poll(Duration::from_millis(100))? {
            if let Some(ref mut watcher) = vault_watcher {
                if app.suppress_file_watch {
                    // Clear suppression and drain events caused by our own save
                    app.suppress_file_watch = false;
                    watcher.drain();
                } else if watcher.check_for_changes() {
                    app.image_cache.clear();
                    app.reload_after_change();
                }
            }
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            // Clear status message on any key press on the board
            if app.mode == AppMode::Board {
                app.status_message = None;
            }

            let mode = app.mode.keybinding_mode();
            if let Some(action) = app.keybindings.dispatch(mode, key) {
                app.handle_action(action);
            }
        }
    }
}
