//! Drawing functions for the home screen
//!
//! Three layers, back to front:
//! - panel with title and the four buttons
//! - status bar with key hints
//! - toast overlay, newest toast at the bottom

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Button};
use crate::toast::{Toast, ToastKind};

use super::button::ButtonWidget;
use super::layout::{toast_area, toast_text_width, HomeLayout};
use super::theme::Theme;

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    let theme = app.theme();
    let area = f.area();

    // Fill background with theme color
    let bg_block = Block::default().style(Style::default().bg(theme.background));
    f.render_widget(bg_block, area);

    let layout = HomeLayout::compute(area, Button::ALL.len());

    draw_panel(f, app, &layout, theme);
    draw_status_bar(f, app, layout.status, theme);
    draw_toasts(f, app.toasts().visible(), layout.panel, theme);
}

fn draw_panel(f: &mut Frame, app: &App, layout: &HomeLayout, theme: &Theme) {
    let appearance = &app.config().appearance;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .title(Span::styled(
            format!(" {} ", appearance.title),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(theme.background));
    f.render_widget(block, layout.panel);

    for (i, (button, rect)) in Button::ALL.iter().zip(&layout.buttons).enumerate() {
        let focused = i == app.focused_index();
        let prefix = if focused {
            &appearance.focused_prefix
        } else {
            &appearance.unfocused_prefix
        };

        let widget = ButtonWidget::new(app.button_label(*button), theme)
            .focused(focused)
            .active(*button == Button::StartTimer && app.is_timer_running())
            .bordered(layout.bordered())
            .prefix(prefix)
            .shortcut(button.shortcut());
        f.render_widget(widget, *rect);
    }
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let status = format!(
        " {} | ↑↓/Tab: focus | Enter: select | t/f/v/y: buttons | q: quit",
        app.timer_label()
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().fg(theme.dimmed).bg(theme.background));
    f.render_widget(status_bar, area);
}

/// Draw visible toasts stacked from the bottom of `area` upward.
/// The newest toast sits lowest.
fn draw_toasts(f: &mut Frame, toasts: &[Toast], area: Rect, theme: &Theme) {
    let text_width = toast_text_width(area);
    if text_width == 0 {
        return;
    }

    let mut offset = 0;
    for toast in toasts.iter().rev() {
        let widest = toast
            .message
            .lines()
            .map(|l| l.width())
            .max()
            .unwrap_or(0)
            .min(text_width as usize) as u16;
        let lines = wrapped_line_count(&toast.message, text_width);

        let Some(rect) = toast_area(area, widest, lines, offset) else {
            break;
        };
        offset = offset.saturating_add(rect.height);

        let border = match toast.kind {
            ToastKind::Info => theme.accent,
            ToastKind::Error => theme.toast_error,
        };
        let text: Vec<Line> = toast.message.lines().map(Line::from).collect();
        let popup = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(theme.toast_fg).bg(theme.toast_bg))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border))
                    .style(Style::default().bg(theme.toast_bg)),
            );

        f.render_widget(Clear, rect);
        f.render_widget(popup, rect);
    }
}

/// Lines a message occupies when wrapped to `width`
fn wrapped_line_count(message: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    let total = message
        .lines()
        .map(|l| l.width().max(1).div_ceil(width))
        .fold(0usize, usize::saturating_add)
        .max(1);
    total.min(u16::MAX as usize) as u16
}
