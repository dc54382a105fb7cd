//! Dynamic layout builder for flexible UI composition
//!
//! Provides a builder pattern for creating layouts that can show/hide sections
//! dynamically based on application state.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use std::collections::HashMap;

/// Section identifiers for layout areas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Title,
    Board,
    Status,
}

/// A dynamic layout that maps section IDs to their rendered areas
pub struct DynamicLayout {
    areas: HashMap<Section, Rect>,
}

impl DynamicLayout {
    /// Start building a vertical layout
    pub fn vertical(area: Rect) -> DynamicLayoutBuilder {
        DynamicLayoutBuilder::new(area, Direction::Vertical)
    }

    /// Get the area for a section by ID
    pub fn get(&self, id: Section) -> Option<Rect> {
        self.areas.get(&id).copied()
    }

    /// Area of a section that is always added; empty if it is missing
    pub fn require(&self, id: Section) -> Rect {
        self.get(id).unwrap_or_default()
    }
}

/// Builder for creating dynamic layouts
pub struct DynamicLayoutBuilder {
    area: Rect,
    direction: Direction,
    sections: Vec<LayoutSection>,
}

struct LayoutSection {
    id: Section,
    constraint: Constraint,
    visible: bool,
}

impl DynamicLayoutBuilder {
    fn new(area: Rect, direction: Direction) -> Self {
        Self {
            area,
            direction,
            sections: Vec::new(),
        }
    }

    /// Add a section that is always visible
    pub fn section(self, id: Section, constraint: Constraint) -> Self {
        self.section_if(true, id, constraint)
    }

    /// Add a section that is conditionally visible
    pub fn section_if(mut self, visible: bool, id: Section, constraint: Constraint) -> Self {
        self.sections.push(LayoutSection {
            id,
            constraint,
            visible,
        });
        self
    }

    /// Build the final layout
    pub fn build(self) -> DynamicLayout {
        let visible: Vec<&LayoutSection> = self.sections.iter().filter(|s| s.visible).collect();

        let chunks = Layout::default()
            .direction(self.direction)
            .constraints(visible.iter().map(|s| s.constraint))
            .split(self.area);

        let areas = visible
            .iter()
            .zip(chunks.iter())
            .map(|(section, rect)| (section.id, *rect))
            .collect();

        DynamicLayout { areas }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sections_visible() {
        let area = Rect::new(0, 0, 100, 50);
        let layout = DynamicLayout::vertical(area)
            .section(Section::Title, Constraint::Length(2))
            .section(Section::Board, Constraint::Min(0))
            .section(Section::Status, Constraint::Length(1))
            .build();

        assert_eq!(layout.require(Section::Title).height, 2);
        assert_eq!(layout.require(Section::Board).height, 47);
        assert_eq!(layout.require(Section::Status).y, 49);
    }

    #[test]
    fn test_hidden_section_gives_space_away() {
        let area = Rect::new(0, 0, 100, 50);
        let layout = DynamicLayout::vertical(area)
            .section_if(false, Section::Title, Constraint::Length(2))
            .section(Section::Board, Constraint::Min(0))
            .build();

        assert!(layout.get(Section::Title).is_none());
        assert_eq!(layout.require(Section::Board).height, 50);
    }
}
