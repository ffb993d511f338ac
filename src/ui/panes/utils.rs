//! Shared helpers for pane rendering: borders, value styling and scrolling

use crate::memory::value::Value;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders},
};

/// Bordered block with the focus highlight
pub(crate) fn pane_block(title: &str, is_focused: bool) -> Block<'static> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Format a value with its highlight colour
pub(crate) fn format_value_styled(value: &Value) -> Span<'static> {
    let color = match value {
        Value::Int(_) | Value::Float(_) => DEFAULT_THEME.number,
        Value::Char(_) | Value::Text(_) => DEFAULT_THEME.string,
        Value::Bool(_) | Value::Null => DEFAULT_THEME.keyword,
        Value::ObjectRef(_) | Value::ArrayRef(_) => DEFAULT_THEME.reference,
    };
    Span::styled(value.to_string(), Style::default().fg(color))
}

pub(crate) fn type_span(type_name: String) -> Span<'static> {
    Span::styled(type_name, Style::default().fg(DEFAULT_THEME.type_name))
}

pub(crate) fn comment_span(text: impl Into<String>) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(DEFAULT_THEME.comment))
}

/// Clamp a scroll offset to the content and return the visible height.
///
/// `usize::MAX` pins the view to the bottom.
pub(crate) fn clamp_scroll(offset: &mut usize, total_items: usize, area: Rect) -> usize {
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Borders, min 1

    if total_items > visible_height {
        let max_scroll = total_items - visible_height;
        *offset = (*offset).min(max_scroll);
    } else {
        *offset = 0;
    }
    visible_height
}
