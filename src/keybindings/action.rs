//! Action definitions for keybindings
//!
//! This module defines all bindable actions in cardboard.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// All bindable actions in cardboard
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "PascalCase")]
#[strum(serialize_all = "PascalCase")]
pub enum Action {
    // === Card Navigation ===
    /// Select the card to the right (wraps to the next row)
    Next,
    /// Select the card to the left (wraps to the previous row)
    Previous,
    /// Select the card one row up
    Up,
    /// Select the card one row down
    Down,
    /// Select the first card
    First,
    /// Select the last card
    Last,

    // === Folders and Notes ===
    /// Enter the selected folder or open the selected note
    Open,
    /// Return to the parent folder
    Back,
    /// Open the selected note or thumbnail with the system handler
    OpenExternal,
    /// Reload the current folder from disk
    Refresh,

    // === Thumbnail Picker ===
    /// Open the thumbnail picker for the selected note
    OpenPicker,
    /// Show the next image in the picker
    PickerNext,
    /// Show the previous image in the picker
    PickerPrevious,
    /// Make the shown image the note's thumbnail
    PickerCommit,
    /// Close the picker without changes
    ClosePicker,

    // === View ===
    /// Make cards wider and taller
    CardSizeIncrease,
    /// Make cards narrower and shorter
    CardSizeDecrease,
    /// Toggle thumbnail rendering
    ToggleImages,
    /// Toggle help
    ToggleHelp,
    /// Scroll help down
    HelpScrollDown,
    /// Scroll help up
    HelpScrollUp,

    // === Application ===
    Quit,
}

impl Action {
    pub fn description(&self) -> &'static str {
        match self {
            Action::Next => "Next card",
            Action::Previous => "Previous card",
            Action::Up => "Card above",
            Action::Down => "Card below",
            Action::First => "First card",
            Action::Last => "Last card",

            Action::Open => "Open folder / note",
            Action::Back => "Parent folder",
            Action::OpenExternal => "Open with system handler",
            Action::Refresh => "Reload folder",

            Action::OpenPicker => "Choose thumbnail",
            Action::PickerNext => "Next image",
            Action::PickerPrevious => "Previous image",
            Action::PickerCommit => "Use as thumbnail",
            Action::ClosePicker => "Close picker",

            Action::CardSizeIncrease => "Larger cards",
            Action::CardSizeDecrease => "Smaller cards",
            Action::ToggleImages => "Toggle thumbnails",
            Action::ToggleHelp => "Toggle help",
            Action::HelpScrollDown => "Scroll help down",
            Action::HelpScrollUp => "Scroll help up",

            Action::Quit => "Quit",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Action::Next
            | Action::Previous
            | Action::Up
            | Action::Down
            | Action::First
            | Action::Last => "Navigation",

            Action::Open | Action::Back | Action::OpenExternal | Action::Refresh => "Folders",

            Action::OpenPicker
            | Action::PickerNext
            | Action::PickerPrevious
            | Action::PickerCommit
            | Action::ClosePicker => "Thumbnail Picker",

            Action::CardSizeIncrease
            | Action::CardSizeDecrease
            | Action::ToggleImages
            | Action::ToggleHelp
            | Action::HelpScrollDown
            | Action::HelpScrollUp => "View",

            Action::Quit => "Application",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_action_is_described() {
        for action in Action::iter() {
            assert!(!action.description().is_empty());
            assert!(!action.category().is_empty());
        }
    }

    #[test]
    fn test_action_names_round_trip() {
        assert_eq!(Action::PickerCommit.to_string(), "PickerCommit");
        assert_eq!(Action::from_str("OpenPicker").unwrap(), Action::OpenPicker);
    }
}
