use crate::keybindings::{KeybindingMode, Keybindings};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Key column width for keybindings
const KEY_COLUMN_WIDTH: usize = 14;

/// Modes listed in the help popup, in display order
const HELP_MODES: [KeybindingMode; 3] = [
    KeybindingMode::Board,
    KeybindingMode::Picker,
    KeybindingMode::Help,
];

#[derive(Debug, Clone, PartialEq)]
pub enum HelpLine {
    Title(&'static str),
    Description(&'static str),
    SectionHeader(String),
    Category(&'static str),
    KeyBinding { key: String, desc: &'static str },
    Blank,
}

impl HelpLine {
    /// Convert this help line to a styled ratatui Line
    pub fn to_line(&self, accent: Color) -> Line<'static> {
        match self {
            HelpLine::Title(text) => Line::from(vec![Span::styled(
                text.to_string(),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )]),
            HelpLine::Description(text) => Line::from(vec![Span::styled(
                text.to_string(),
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::ITALIC),
            )]),
            HelpLine::SectionHeader(text) => Line::from(vec![Span::styled(
                text.clone(),
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::UNDERLINED),
            )]),
            HelpLine::Category(text) => Line::from(vec![Span::styled(
                format!(" {}", text),
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            HelpLine::KeyBinding { key, desc } => {
                let formatted_key = format!("  {:<width$}", key, width = KEY_COLUMN_WIDTH);
                Line::from(vec![
                    Span::styled(formatted_key, Style::default().fg(accent)),
                    Span::raw(desc.to_string()),
                ])
            }
            HelpLine::Blank => Line::from(""),
        }
    }
}

/// Help content for the current keybindings, grouped by mode and category.
pub fn help_lines(keybindings: &Keybindings) -> Vec<HelpLine> {
    let mut lines = vec![
        HelpLine::Title("cardboard - Keyboard Shortcuts"),
        HelpLine::Description("Use j/k or ↓/↑ to scroll | Press Esc or ? to close"),
        HelpLine::Blank,
    ];

    for mode in HELP_MODES {
        let entries = keybindings.help_entries(mode);
        if entries.is_empty() {
            continue;
        }

        lines.push(HelpLine::SectionHeader(mode.display_name().to_string()));
        let mut category = "";
        for (action, mut keys) in entries {
            if action.category() != category {
                category = action.category();
                lines.push(HelpLine::Category(category));
            }
            keys.sort();
            lines.push(HelpLine::KeyBinding {
                key: keys.join("/"),
                desc: action.description(),
            });
        }
        lines.push(HelpLine::Blank);
    }

    lines
}

pub fn build_help_text(keybindings: &Keybindings, accent: Color) -> Vec<Line<'static>> {
    help_lines(keybindings)
        .iter()
        .map(|line| line.to_line(accent))
        .collect()
}

pub fn help_line_count(keybindings: &Keybindings) -> usize {
    help_lines(keybindings).len()
}
