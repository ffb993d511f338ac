//! Command input line

use super::utils::pane_block;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render the input line and place the terminal cursor in it.
///
/// `cursor` is a char index into `input`. While an earlier snapshot is being
/// browsed the line is dimmed and no cursor is shown.
pub fn render_input_line(frame: &mut Frame, area: Rect, input: &str, cursor: usize, browsing: bool) {
    let prompt = "› ";
    let text_color = if browsing {
        DEFAULT_THEME.comment
    } else {
        DEFAULT_THEME.fg
    };

    let line = Line::from(vec![
        Span::styled(prompt, Style::default().fg(DEFAULT_THEME.primary)),
        Span::styled(input.to_string(), Style::default().fg(text_color)),
    ]);
    let paragraph = Paragraph::new(line).block(pane_block("Command", !browsing));
    frame.render_widget(paragraph, area);

    if !browsing {
        // One column for the border, then the prompt
        let column = area.x + 1 + prompt.chars().count() as u16 + cursor as u16;
        let max_column = area.x + area.width.saturating_sub(2);
        frame.set_cursor_position((column.min(max_column), area.y + 1));
    }
}
