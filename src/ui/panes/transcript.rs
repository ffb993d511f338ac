//! Transcript pane rendering

use super::utils::{clamp_scroll, pane_block};
use crate::snapshot::Transcript;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the command transcript pane
pub fn render_transcript_pane(
    frame: &mut Frame,
    area: Rect,
    transcript: &Transcript,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block("Transcript", is_focused);

    if transcript.entries.is_empty() {
        let paragraph = Paragraph::new("(no commands yet)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let all_items: Vec<ListItem> = transcript
        .entries
        .iter()
        .flat_map(|entry| {
            let (label, color) = if entry.outcome.ok {
                ("ok", DEFAULT_THEME.success)
            } else {
                ("error", DEFAULT_THEME.error)
            };
            [
                ListItem::new(Line::from(vec![
                    Span::styled("> ", Style::default().fg(DEFAULT_THEME.comment)),
                    Span::styled(entry.command.clone(), Style::default().fg(DEFAULT_THEME.fg)),
                ])),
                ListItem::new(Line::from(vec![
                    Span::styled(format!("  {}: ", label), Style::default().fg(color)),
                    Span::styled(
                        entry.outcome.message.clone(),
                        Style::default().fg(DEFAULT_THEME.comment),
                    ),
                ])),
            ]
        })
        .collect();

    let visible_height = clamp_scroll(scroll_offset, all_items.len(), area);
    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
