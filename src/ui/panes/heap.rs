//! Heap pane rendering
//!
//! Live entries in allocation order: address, type and reference count on a
//! header line, then one line per field or element.

use super::utils::{clamp_scroll, comment_span, format_value_styled, pane_block, type_span};
use crate::memory::heap::HeapValue;
use crate::snapshot::{HeapView, Snapshot};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

/// Render the heap pane
pub fn render_heap_pane(
    frame: &mut Frame,
    area: Rect,
    snapshot: &Snapshot,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = format!("Heap ({} live)", snapshot.heap.len());
    let block = pane_block(&title, is_focused);

    if snapshot.heap.is_empty() {
        let paragraph = Paragraph::new("(empty)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let all_items: Vec<ListItem> = snapshot
        .heap
        .iter()
        .flat_map(entry_lines)
        .map(ListItem::new)
        .collect();

    let visible_height = clamp_scroll(scroll_offset, all_items.len(), area);
    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

fn entry_lines(entry: &HeapView) -> Vec<Line<'static>> {
    let count_color = if entry.ref_count > 1 {
        DEFAULT_THEME.secondary
    } else {
        DEFAULT_THEME.success
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            entry.address.to_string(),
            Style::default()
                .fg(DEFAULT_THEME.reference)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        type_span(entry.entry_type.to_string()),
        comment_span("  refs: "),
        Span::styled(entry.ref_count.to_string(), Style::default().fg(count_color)),
    ])];

    match &entry.value {
        HeapValue::Object(fields) => {
            for field in fields {
                lines.push(Line::from(vec![
                    Span::raw("    "),
                    type_span(field.field_type.to_string()),
                    Span::styled(format!(" {}", field.name), Style::default().fg(DEFAULT_THEME.fg)),
                    comment_span(" = "),
                    format_value_styled(&field.value),
                ]));
            }
        }
        HeapValue::Array(elements) => {
            for (index, element) in elements.iter().enumerate() {
                lines.push(Line::from(vec![
                    comment_span(format!("    [{}] ", index)),
                    format_value_styled(element),
                ]));
            }
        }
    }

    lines
}
