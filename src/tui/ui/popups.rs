//! Popup and overlay rendering for the TUI
//!
//! Handles the thumbnail picker and the help overlay.

use crate::tui::app::App;
use crate::tui::help_text;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};
use ratatui_image::StatefulImage;

use super::util::{popup_area, truncate_to_width};

/// Shown in the picker when the note embeds no images
pub const NO_IMAGES_MESSAGE: &str = "No images found in this note.";

/// Render the help popup with keyboard shortcuts
pub fn render_help_popup(frame: &mut Frame, app: &App, area: Rect) {
    // Min 40 cols for readability, min 10 rows for usable scroll area
    let popup_area = popup_area(area, 70, 80, 40, 10);
    let accent = app.config.accent_color();

    frame.render_widget(Clear, popup_area);

    let help_lines = help_text::build_help_text(&app.keybindings, accent);
    let help_text_len = help_lines.len();

    let paragraph = Paragraph::new(help_lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .title(" Help "),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, popup_area);

    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"))
        .style(Style::default().fg(accent));

    let mut scrollbar_state = ScrollbarState::new(help_text_len).position(app.help_scroll as usize);

    frame.render_stateful_widget(
        scrollbar,
        popup_area.inner(Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut scrollbar_state,
    );
}

/// Render the thumbnail picker: the image under the cursor, its path and position.
pub fn render_picker_popup(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(picker) = app.picker.as_ref() else {
        return;
    };
    let accent = app.config.accent_color();

    let popup_area = popup_area(area, 70, 80, 36, 12);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .title(format!(" Thumbnail for {} ", picker.note_name()));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let Some((position, total)) = picker.position() else {
        let message = Paragraph::new(NO_IMAGES_MESSAGE)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        let [_, middle, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(inner);
        frame.render_widget(message, middle);
        return;
    };

    let [image_area, info_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(2)]).areas(inner);

    let reference_path = picker.current().map(|r| r.path.clone()).unwrap_or_default();
    let target = picker.display_target(&app.vault);

    match target {
        Some(path) if app.images_enabled && app.image_cache.is_initialized() => {
            match app.image_cache.protocol(&path) {
                Ok(protocol) => frame.render_stateful_widget(
                    StatefulImage::default(),
                    image_area.inner(Margin {
                        vertical: 0,
                        horizontal: 1,
                    }),
                    protocol,
                ),
                Err(e) => render_centered(frame, image_area, &format!("✗ Cannot show image: {}", e)),
            }
        }
        Some(path) => render_centered(frame, image_area, &path.display().to_string()),
        None => render_centered(frame, image_area, &format!("✗ Image not found: {}", reference_path)),
    }

    let counter = format!("{}/{}", position, total);
    let path_width = (info_area.width as usize).saturating_sub(counter.len() + 3);
    let info = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", counter),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ),
            Span::raw(truncate_to_width(&reference_path, path_width)),
        ]),
        Line::from(Span::styled(
            " ←/→ browse • Enter use as thumbnail • Esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(info, info_area);
}

fn render_centered(frame: &mut Frame, area: Rect, text: &str) {
    let paragraph = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Gray));
    let offset = area.height / 2;
    frame.render_widget(
        paragraph,
        Rect {
            y: area.y + offset,
            height: area.height - offset,
            ..area
        },
    );
}
