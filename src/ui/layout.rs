//! Home screen layout
//!
//! Buttons are stacked vertically and centered:
//!
//! ```text
//! ┌ EmotiStudy ─────────────────┐
//! │                             │
//! │   ┌──────────────────────┐  │
//! │   │  Start Study Timer   │  │
//! │   └──────────────────────┘  │
//! │   ┌──────────────────────┐  │
//! │   │     Detect Mood      │  │
//! │   └──────────────────────┘  │
//! │             ...             │
//! └─────────────────────────────┘
//!  status bar
//! ```
//!
//! The same layout is used for drawing and for mouse hit-testing, so a
//! click always lands on the button that was drawn there.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Preferred button width in cells
const BUTTON_WIDTH: u16 = 36;
/// Button height with borders
const BUTTON_HEIGHT: u16 = 3;
/// Widest a toast gets
const TOAST_MAX_WIDTH: u16 = 48;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeLayout {
    /// Bordered main panel
    pub panel: Rect,
    /// One rect per button, in `Button::ALL` order
    pub buttons: Vec<Rect>,
    /// Single-line status bar
    pub status: Rect,
}

impl HomeLayout {
    /// Compute the layout for `count` buttons in `area`
    pub fn compute(area: Rect, count: usize) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Panel
                Constraint::Length(1), // Status bar
            ])
            .split(area);
        let panel = chunks[0];
        let status = chunks[1];

        // Inside the panel border
        let inner = Rect {
            x: panel.x + 1,
            y: panel.y + 1,
            width: panel.width.saturating_sub(2),
            height: panel.height.saturating_sub(2),
        };

        let count_u16 = count as u16;
        // Fall back to borderless one-line buttons on short terminals
        let height = if inner.height >= BUTTON_HEIGHT * count_u16 {
            BUTTON_HEIGHT
        } else {
            1
        };
        let width = BUTTON_WIDTH.min(inner.width);
        let x = inner.x + (inner.width - width) / 2;
        let total_height = (height * count_u16).min(inner.height);
        let top = inner.y + (inner.height - total_height) / 2;

        let buttons = (0..count_u16)
            .map(|i| {
                let y = top + i * height;
                if y + height > inner.y + inner.height || width == 0 {
                    Rect::new(x, y.min(inner.y + inner.height), 0, 0)
                } else {
                    Rect::new(x, y, width, height)
                }
            })
            .collect();

        Self {
            panel,
            buttons,
            status,
        }
    }

    /// Index of the button under a cell, if any
    pub fn button_at(&self, column: u16, row: u16) -> Option<usize> {
        self.buttons.iter().position(|r| {
            r.width > 0
                && r.height > 0
                && column >= r.x
                && column < r.x + r.width
                && row >= r.y
                && row < r.y + r.height
        })
    }

    /// Whether buttons are drawn with borders
    pub fn bordered(&self) -> bool {
        self.buttons.first().is_some_and(|r| r.height >= BUTTON_HEIGHT)
    }
}

/// Area for a toast holding `lines` lines of text, stacked upward from
/// the bottom of `area`. `offset` is the number of rows already taken by
/// toasts below it.
pub fn toast_area(area: Rect, width: u16, lines: u16, offset: u16) -> Option<Rect> {
    let width = width.saturating_add(4).min(TOAST_MAX_WIDTH).min(area.width);
    let height = lines.saturating_add(2);
    // Keep clear of the status bar
    let bottom = area.y.saturating_add(area.height).saturating_sub(2);
    let y = bottom.checked_sub(offset.saturating_add(height))?;
    if y < area.y || width == 0 {
        return None;
    }

    let x = area.x + (area.width - width) / 2;
    Some(Rect::new(x, y, width, height))
}

/// Max text width inside a toast
pub fn toast_text_width(area: Rect) -> u16 {
    TOAST_MAX_WIDTH.min(area.width).saturating_sub(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_centered_and_stacked() {
        let layout = HomeLayout::compute(Rect::new(0, 0, 80, 24), 4);
        assert_eq!(layout.buttons.len(), 4);
        assert!(layout.bordered());

        let first = layout.buttons[0];
        assert_eq!(first.width, BUTTON_WIDTH);
        assert_eq!(first.x, 1 + (78 - BUTTON_WIDTH) / 2);
        for pair in layout.buttons.windows(2) {
            assert_eq!(pair[1].y, pair[0].y + BUTTON_HEIGHT);
            assert_eq!(pair[1].x, pair[0].x);
        }
        assert_eq!(layout.status, Rect::new(0, 23, 80, 1));
    }

    #[test]
    fn test_short_terminal_uses_single_line_buttons() {
        let layout = HomeLayout::compute(Rect::new(0, 0, 40, 8), 4);
        assert!(!layout.bordered());
        assert!(layout.buttons.iter().all(|r| r.height == 1));
    }

    #[test]
    fn test_button_at() {
        let layout = HomeLayout::compute(Rect::new(0, 0, 80, 24), 4);
        let third = layout.buttons[2];
        assert_eq!(layout.button_at(third.x, third.y), Some(2));
        assert_eq!(layout.button_at(third.x + third.width - 1, third.y + 2), Some(2));
        assert_eq!(layout.button_at(0, 0), None);
        assert_eq!(layout.button_at(third.x + third.width, third.y), None);
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        for (w, h) in [(0, 0), (1, 1), (3, 2), (10, 3)] {
            let layout = HomeLayout::compute(Rect::new(0, 0, w, h), 4);
            assert_eq!(layout.buttons.len(), 4);
        }
    }

    #[test]
    fn test_toast_area_stacks_upward() {
        let area = Rect::new(0, 0, 80, 24);
        let first = toast_area(area, 20, 1, 0).unwrap();
        assert_eq!(first.height, 3);
        assert_eq!(first.y + first.height, 22);
        assert_eq!(first.width, 24);

        let second = toast_area(area, 20, 2, first.height).unwrap();
        assert_eq!(second.y + second.height, first.y);

        assert_eq!(toast_area(area, 20, 30, 0), None);
    }

    #[test]
    fn test_toast_area_saturates() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(toast_area(area, u16::MAX, u16::MAX, 0), None);
        assert_eq!(toast_area(area, 20, 1, u16::MAX), None);
    }
}
