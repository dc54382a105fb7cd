//! Default keybindings for cardboard
//!
//! This module defines the default keybindings that are used when no
//! user configuration is provided. Uses keybinds-rs key string syntax.

use super::{Action, KeybindingMode, Keybindings};

/// Create the default keybindings configuration
pub fn default_keybindings() -> Keybindings {
    let mut kb = Keybindings::new();

    add_board_mode(&mut kb);
    add_picker_mode(&mut kb);
    add_help_mode(&mut kb);

    kb
}

/// Bind a key, panicking on invalid key syntax (only used for built-in defaults)
fn bind(kb: &mut Keybindings, mode: KeybindingMode, key: &str, action: Action) {
    kb.bind(mode, key, action)
        .unwrap_or_else(|e| panic!("Invalid default keybinding '{}': {}", key, e));
}

fn add_board_mode(kb: &mut Keybindings) {
    use Action::*;
    use KeybindingMode::Board;

    // Navigation
    bind(kb, Board, "l", Next);
    bind(kb, Board, "Right", Next);
    bind(kb, Board, "Tab", Next);
    bind(kb, Board, "h", Previous);
    bind(kb, Board, "Left", Previous);
    bind(kb, Board, "Shift+Tab", Previous);
    bind(kb, Board, "k", Up);
    bind(kb, Board, "Up", Up);
    bind(kb, Board, "j", Down);
    bind(kb, Board, "Down", Down);
    bind(kb, Board, "g", First);
    bind(kb, Board, "G", Last);

    // Folders and notes
    bind(kb, Board, "Enter", Open);
    bind(kb, Board, "Backspace", Back);
    bind(kb, Board, "b", Back);
    bind(kb, Board, "o", OpenExternal);
    bind(kb, Board, "r", Refresh);
    bind(kb, Board, "t", OpenPicker);

    // View
    bind(kb, Board, "]", CardSizeIncrease);
    bind(kb, Board, "[", CardSizeDecrease);
    bind(kb, Board, "i", ToggleImages);
    bind(kb, Board, "?", ToggleHelp);

    // Application
    bind(kb, Board, "q", Quit);
    bind(kb, Board, "Ctrl+c", Quit);
}

fn add_picker_mode(kb: &mut Keybindings) {
    use Action::*;
    use KeybindingMode::Picker;

    bind(kb, Picker, "l", PickerNext);
    bind(kb, Picker, "Right", PickerNext);
    bind(kb, Picker, "j", PickerNext);
    bind(kb, Picker, "Tab", PickerNext);
    bind(kb, Picker, "h", PickerPrevious);
    bind(kb, Picker, "Left", PickerPrevious);
    bind(kb, Picker, "k", PickerPrevious);
    bind(kb, Picker, "Shift+Tab", PickerPrevious);
    bind(kb, Picker, "Enter", PickerCommit);
    bind(kb, Picker, "Escape", ClosePicker);
    bind(kb, Picker, "t", ClosePicker);
    bind(kb, Picker, "q", ClosePicker);
    bind(kb, Picker, "Ctrl+c", Quit);
}

fn add_help_mode(kb: &mut Keybindings) {
    use Action::*;
    use KeybindingMode::Help;

    bind(kb, Help, "j", HelpScrollDown);
    bind(kb, Help, "Down", HelpScrollDown);
    bind(kb, Help, "k", HelpScrollUp);
    bind(kb, Help, "Up", HelpScrollUp);
    bind(kb, Help, "?", ToggleHelp);
    bind(kb, Help, "Escape", ToggleHelp);
    bind(kb, Help, "q", Quit);
    bind(kb, Help, "Ctrl+c", Quit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

    fn make_key_event(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_default_board_mode() {
        let mut kb = default_keybindings();

        assert_eq!(
            kb.dispatch(
                KeybindingMode::Board,
                make_key_event(KeyCode::Char('l'), KeyModifiers::NONE)
            ),
            Some(Action::Next)
        );
        assert_eq!(
            kb.dispatch(
                KeybindingMode::Board,
                make_key_event(KeyCode::Enter, KeyModifiers::NONE)
            ),
            Some(Action::Open)
        );
        assert_eq!(
            kb.dispatch(
                KeybindingMode::Board,
                make_key_event(KeyCode::Char('t'), KeyModifiers::NONE)
            ),
            Some(Action::OpenPicker)
        );
        assert_eq!(
            kb.dispatch(
                KeybindingMode::Board,
                make_key_event(KeyCode::Char('q'), KeyModifiers::NONE)
            ),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_default_picker_mode() {
        let mut kb = default_keybindings();

        assert_eq!(
            kb.dispatch(
                KeybindingMode::Picker,
                make_key_event(KeyCode::Right, KeyModifiers::NONE)
            ),
            Some(Action::PickerNext)
        );
        assert_eq!(
            kb.dispatch(
                KeybindingMode::Picker,
                make_key_event(KeyCode::Left, KeyModifiers::NONE)
            ),
            Some(Action::PickerPrevious)
        );
        assert_eq!(
            kb.dispatch(
                KeybindingMode::Picker,
                make_key_event(KeyCode::Esc, KeyModifiers::NONE)
            ),
            Some(Action::ClosePicker)
        );
    }

    #[test]
    fn test_all_modes_have_bindings() {
        let kb = default_keybindings();

        for mode in [
            KeybindingMode::Board,
            KeybindingMode::Picker,
            KeybindingMode::Help,
        ] {
            assert!(
                !kb.help_entries(mode).is_empty(),
                "Mode {:?} has no bindings",
                mode
            );
        }
    }
}
