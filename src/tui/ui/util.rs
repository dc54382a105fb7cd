//! Utility functions for UI rendering
//!
//! Pure functions for layout calculations and text fitting.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Calculate a centered rectangular area within a parent area.
///
/// Returns a `Rect` that is centered both horizontally and vertically,
/// sized as a percentage of the parent area.
pub fn centered_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// Centered popup area with a minimum size, never larger than `area`.
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16, min_width: u16, min_height: u16) -> Rect {
    let mut popup = centered_area(area, percent_x, percent_y);

    let width = popup.width.max(min_width).min(area.width);
    let height = popup.height.max(min_height).min(area.height);
    popup.x = area.x + (area.width - width) / 2;
    popup.y = area.y + (area.height - height) / 2;
    popup.width = width;
    popup.height = height;
    popup
}

/// Card slots of a grid: the rect of each visible card, with its index.
///
/// `first_row` is the first row shown; rows that do not fit are skipped.
pub fn grid_cells(
    area: Rect,
    card_width: u16,
    card_height: u16,
    count: usize,
    first_row: usize,
) -> Vec<(usize, Rect)> {
    let (columns, rows) = grid_shape(area, card_width, card_height);

    let mut cells = Vec::new();
    for row in 0..rows {
        for column in 0..columns {
            let index = (first_row + row) * columns + column;
            if index >= count {
                return cells;
            }
            cells.push((
                index,
                Rect::new(
                    area.x + column as u16 * card_width,
                    area.y + row as u16 * card_height,
                    card_width,
                    card_height,
                ),
            ));
        }
    }
    cells
}

/// (columns, visible rows) for a grid of cards, each at least 1.
pub fn grid_shape(area: Rect, card_width: u16, card_height: u16) -> (usize, usize) {
    let columns = (area.width / card_width.max(1)).max(1) as usize;
    let rows = (area.height / card_height.max(1)).max(1) as usize;
    (columns, rows)
}

/// Cut `text` to at most `width` display cells, ending with `…` when cut.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
