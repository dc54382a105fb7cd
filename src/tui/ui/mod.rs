mod layout;
mod popups;
mod util;

use layout::{DynamicLayout, Section};

use crate::board::Card;
use crate::keybindings::{Action, KeybindingMode};
use crate::media::MediaKind;
use crate::tui::app::{App, AppMode};
use crate::tui::image_cache::ImageCache;
use popups::{render_help_popup, render_picker_popup};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use ratatui_image::StatefulImage;
use util::{grid_cells, grid_shape, truncate_to_width};

const FOLDER_GLYPH: &str = "📁";
const VIDEO_PLACEHOLDER: &str = "▶ video";

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let main_layout = DynamicLayout::vertical(area)
        .section(Section::Title, Constraint::Length(2))
        .section(Section::Board, Constraint::Min(0))
        .section(Section::Status, Constraint::Length(1))
        .build();

    render_title_bar(frame, app, main_layout.require(Section::Title));
    render_board(frame, app, main_layout.require(Section::Board));
    render_status_bar(frame, app, main_layout.require(Section::Status));

    match app.mode {
        AppMode::Picker => render_picker_popup(frame, app, area),
        AppMode::Help => render_help_popup(frame, app, area),
        AppMode::Board => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title_text = format!("cardboard - {} - {} cards", app.breadcrumb(), app.cards.len());

    let title = Paragraph::new(title_text)
        .style(
            Style::default()
                .fg(app.config.accent_color())
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, area);
}

fn render_board(frame: &mut Frame, app: &mut App, area: Rect) {
    if app.cards.is_empty() {
        let empty = Paragraph::new("This folder has no notes or subfolders.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty, area);
        return;
    }

    let (card_width, card_height) = (app.config.board.card_width, app.config.board.card_height);
    let (columns, rows) = grid_shape(area, card_width, card_height);
    app.columns = columns;
    app.ensure_visible(rows);

    for (index, cell) in grid_cells(area, card_width, card_height, app.cards.len(), app.scroll_row) {
        let selected = index == app.selected;
        let card = &app.cards[index];
        render_card(
            frame,
            card,
            cell,
            selected,
            app.images_enabled,
            &mut app.image_cache,
            CardColors {
                accent: app.config.accent_color(),
                border: app.config.border_color(),
                selection_bg: app.config.selection_bg(),
            },
        );
    }
}

struct CardColors {
    accent: Color,
    border: Color,
    selection_bg: Color,
}

fn render_card(
    frame: &mut Frame,
    card: &Card,
    area: Rect,
    selected: bool,
    images_enabled: bool,
    image_cache: &mut ImageCache,
    colors: CardColors,
) {
    let title_width = area.width.saturating_sub(4) as usize;
    let title = if card.is_folder() {
        format!(" {} {} ", FOLDER_GLYPH, truncate_to_width(card.title(), title_width.saturating_sub(3)))
    } else {
        format!(" {} ", truncate_to_width(card.title(), title_width))
    };

    let (border_style, border_type, bg) = if selected {
        (
            Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
            BorderType::Thick,
            Style::default().bg(colors.selection_bg),
        )
    } else {
        (
            Style::default().fg(colors.border),
            BorderType::Rounded,
            Style::default(),
        )
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(title)
        .style(bg);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if card.is_folder() {
        render_placeholder(frame, inner, FOLDER_GLYPH, Style::default());
        return;
    }

    let Some(thumbnail) = &card.thumbnail else {
        // No thumbnail: the note name fills the card
        let name = Paragraph::new(card.title().to_string())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(name, vertically_centered(inner, 1));
        return;
    };

    match thumbnail.kind {
        MediaKind::Video => {
            render_placeholder(frame, inner, VIDEO_PLACEHOLDER, Style::default().fg(colors.accent))
        }
        MediaKind::Image if images_enabled && image_cache.is_initialized() => {
            match image_cache.protocol(&thumbnail.path) {
                Ok(protocol) => frame.render_stateful_widget(StatefulImage::default(), inner, protocol),
                Err(_) => render_placeholder(
                    frame,
                    inner,
                    "✗ image",
                    Style::default().fg(Color::DarkGray),
                ),
            }
        }
        MediaKind::Image => {
            let name = thumbnail
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let label = format!("🖼 {}", truncate_to_width(&name, inner.width.saturating_sub(3) as usize));
            render_placeholder(frame, inner, &label, Style::default().fg(Color::DarkGray));
        }
    }
}

fn render_placeholder(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .style(style);
    frame.render_widget(paragraph, vertically_centered(area, 1));
}

/// Part of `area` starting where a block of `height` rows would be centered
fn vertically_centered(area: Rect, height: u16) -> Rect {
    let offset = (area.height - height.min(area.height)) / 2;
    Rect {
        y: area.y + offset,
        height: area.height - offset,
        ..area
    }
}

/// `key:Label` hint for the first key bound to an action
fn hint(app: &App, mode: KeybindingMode, action: Action, label: &str) -> Option<String> {
    app.keybindings
        .keys_for_action(mode, action)
        .into_iter()
        .next()
        .map(|key| format!("{}:{}", key, label))
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // If there's a status message, display it prominently
    if let Some(ref msg) = app.status_message {
        let status = Paragraph::new(format!(" {}", msg)).style(
            Style::default()
                .bg(Color::Rgb(0, 80, 120))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status, area);
        return;
    }

    let mode = app.mode.keybinding_mode();
    let hints: Vec<String> = match app.mode {
        AppMode::Board => [
            (Action::Open, "Open"),
            (Action::Back, "Back"),
            (Action::OpenPicker, "Thumbnail"),
            (Action::CardSizeIncrease, "Bigger"),
            (Action::CardSizeDecrease, "Smaller"),
            (Action::ToggleHelp, "Help"),
            (Action::Quit, "Quit"),
        ]
        .iter()
        .filter_map(|(action, label)| hint(app, mode, *action, label))
        .collect(),
        AppMode::Picker => [
            (Action::PickerPrevious, "Prev"),
            (Action::PickerNext, "Next"),
            (Action::PickerCommit, "Use"),
            (Action::ClosePicker, "Cancel"),
        ]
        .iter()
        .filter_map(|(action, label)| hint(app, mode, *action, label))
        .collect(),
        AppMode::Help => [(Action::ToggleHelp, "Close")]
            .iter()
            .filter_map(|(action, label)| hint(app, mode, *action, label))
            .collect(),
    };

    let position = if app.cards.is_empty() {
        "0/0".to_string()
    } else {
        format!("{}/{}", app.selected + 1, app.cards.len())
    };
    let images = if app.images_enabled { "" } else { " [NO IMAGES]" };

    let line = Line::from(vec![
        Span::styled(
            format!(" [{}] {}{} ", mode.display_name(), position, images),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("• {} ", hints.join(" • "))),
    ]);

    let status = Paragraph::new(line).style(Style::default().bg(Color::Rgb(30, 30, 40)).fg(Color::White));
    frame.render_widget(status, area);
}
