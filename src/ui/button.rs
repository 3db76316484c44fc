//! Button widget for the home screen
//!
//! Renders a label centered in its area, optionally inside a border.
//! The focused button gets the focus colors and the focus prefix.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Widget},
};
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;

pub struct ButtonWidget<'a> {
    label: &'a str,
    shortcut: Option<char>,
    focused: bool,
    active: bool,
    bordered: bool,
    prefix: &'a str,
    theme: &'a Theme,
}

impl<'a> ButtonWidget<'a> {
    pub fn new(label: &'a str, theme: &'a Theme) -> Self {
        Self {
            label,
            shortcut: None,
            focused: false,
            active: false,
            bordered: true,
            prefix: "",
            theme,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Highlight as running (the timer button during a countdown)
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn bordered(mut self, bordered: bool) -> Self {
        self.bordered = bordered;
        self
    }

    pub fn prefix(mut self, prefix: &'a str) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn shortcut(mut self, shortcut: char) -> Self {
        self.shortcut = Some(shortcut);
        self
    }
}

impl<'a> Widget for ButtonWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let bg = if self.focused { self.theme.focus_bg } else { self.theme.background };
        let mut fg = if self.focused { self.theme.focus_fg } else { self.theme.foreground };
        if self.active {
            fg = self.theme.timer_active;
        }

        let inner = if self.bordered {
            let border = if self.focused { self.theme.accent } else { self.theme.dimmed_alt };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .style(Style::default().bg(bg));
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            buf.set_style(area, Style::default().bg(bg));
            area
        };

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let mut style = Style::default().fg(fg).bg(bg);
        if self.focused {
            style = style.add_modifier(Modifier::BOLD);
        }

        let text = format!("{}{}", self.prefix, self.label);
        let text = truncate_to_width(&text, inner.width as usize);
        let text_width = text.width() as u16;
        let x = inner.x + (inner.width - text_width) / 2;
        let y = inner.y + inner.height / 2;
        buf.set_stringn(x, y, &text, inner.width as usize, style);

        // Shortcut hint in the right corner, space permitting
        if let Some(key) = self.shortcut {
            let hint_x = inner.x + inner.width - 1;
            if inner.width > text_width + 4 && hint_x >= x + text_width + 1 {
                let hint_style = Style::default().fg(self.theme.dimmed).bg(bg);
                buf.set_stringn(hint_x, y, key.to_string(), 1, hint_style);
            }
        }
    }
}

/// Truncate text to fit within max display width, with ellipsis
fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let char_width = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + char_width + 1 > max_width {
            break;
        }
        out.push(c);
        width += char_width;
    }
    out.push('…');
    out
}
