//! Stack pane rendering with call frames and their locals
//!
//! Frames are listed outermost first. Each frame shows its function name,
//! the line it was entered from, and its locals in assignment order.

use super::utils::{clamp_scroll, pane_block, variable_line};
use crate::memory::StackFrame;
use crate::parser::Language;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

/// Scroll state for the stack pane
#[derive(Debug, Default)]
pub struct StackScrollState {
    pub offset: usize,
    pub prev_item_count: usize,
}

/// Render the stack pane
pub fn render_stack_pane(
    frame: &mut Frame,
    area: Rect,
    frames: &[StackFrame],
    language: Language,
    is_focused: bool,
    scroll_state: &mut StackScrollState,
) {
    let block = pane_block(" Call Stack ", is_focused);
    let mut all_items = Vec::new();

    if frames.is_empty() {
        all_items.push(ListItem::new("(empty)").style(Style::default().fg(DEFAULT_THEME.comment)));
    }

    for (depth, stack_frame) in frames.iter().enumerate() {
        let is_top = depth + 1 == frames.len();
        let marker_style = if is_top {
            Style::default().fg(DEFAULT_THEME.secondary)
        } else {
            Style::default().fg(DEFAULT_THEME.comment)
        };
        all_items.push(ListItem::new(Line::from(vec![
            Span::styled("▸ ", marker_style),
            Span::styled(
                format!("Frame {depth} "),
                Style::default().fg(DEFAULT_THEME.comment),
            ),
            Span::styled("│ ", Style::default().fg(DEFAULT_THEME.comment)),
            Span::styled(
                format!("{}()", stack_frame.function_name),
                Style::default()
                    .fg(DEFAULT_THEME.function)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  line {}", stack_frame.entry_line),
                Style::default().fg(DEFAULT_THEME.comment),
            ),
        ])));

        if stack_frame.locals.is_empty() {
            all_items.push(
                ListItem::new("    (no locals)").style(Style::default().fg(DEFAULT_THEME.comment)),
            );
        }
        for var in stack_frame.locals.iter() {
            all_items.push(ListItem::new(variable_line(var, language, 4)));
        }
    }

    // Follow the innermost frame when the stack grows
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    if all_items.len() > scroll_state.prev_item_count {
        scroll_state.offset = usize::MAX;
    }
    scroll_state.prev_item_count = all_items.len();
    clamp_scroll(&mut scroll_state.offset, all_items.len(), visible_height);

    let visible: Vec<ListItem> = all_items
        .into_iter()
        .skip(scroll_state.offset)
        .take(visible_height)
        .collect();
    frame.render_widget(List::new(visible).block(block), area);
}
