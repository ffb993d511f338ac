//! Stack pane rendering
//!
//! Frames are listed oldest first, each with a header (`▸ #id name`) and its
//! slots in declaration order. Reference slots show the address they hold
//! behind an arrow; primitive slots show their value.

use super::utils::{clamp_scroll, comment_span, format_value_styled, pane_block, type_span};
use crate::snapshot::{FrameView, Snapshot};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

/// Render the stack pane
pub fn render_stack_pane(
    frame: &mut Frame,
    area: Rect,
    snapshot: &Snapshot,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block("Call Stack", is_focused);
    let innermost = snapshot.frames.len().saturating_sub(1);

    let all_items: Vec<ListItem> = snapshot
        .frames
        .iter()
        .enumerate()
        .flat_map(|(depth, stack_frame)| frame_lines(stack_frame, depth == innermost))
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

fn frame_lines(stack_frame: &FrameView, is_current: bool) -> Vec<Line<'static>> {
    let marker_style = if is_current {
        Style::default().fg(DEFAULT_THEME.secondary)
    } else {
        Style::default().fg(DEFAULT_THEME.comment)
    };

    let mut lines = vec![Line::from(vec![
        Span::styled("▸ ", marker_style),
        comment_span(format!("#{} │ ", stack_frame.id)),
        Span::styled(
            stack_frame.name.clone(),
            Style::default()
                .fg(DEFAULT_THEME.frame_name)
                .add_modifier(Modifier::BOLD),
        ),
    ])];

    if stack_frame.slots.is_empty() {
        lines.push(Line::from(comment_span("    (no variables)")));
    }

    for slot in &stack_frame.slots {
        let arrow = if slot.is_reference { " → " } else { " = " };
        lines.push(Line::from(vec![
            comment_span(format!("  {} ", slot.address)),
            type_span(slot.declared_type.to_string()),
            Span::styled(format!(" {}", slot.name), Style::default().fg(DEFAULT_THEME.fg)),
            comment_span(arrow),
            format_value_styled(&slot.value),
        ]));
    }

    lines
}
