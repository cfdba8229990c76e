//! Heap pane rendering
//!
//! Lists the heap objects of the current step in id order. Each entry shows
//! the id, kind and declared label, the names referring to it, and the
//! payload as the traced language would print it.

use super::utils::{clamp_scroll, pane_block};
use crate::interpreter::display_value;
use crate::memory::{Heap, HeapObject};
use crate::parser::Language;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

/// Scroll state for the heap pane
#[derive(Debug, Default)]
pub struct HeapScrollState {
    pub offset: usize,
    pub prev_item_count: usize,
}

/// Render the heap pane
pub fn render_heap_pane(
    frame: &mut Frame,
    area: Rect,
    objects: &[HeapObject],
    language: Language,
    is_focused: bool,
    scroll_state: &mut HeapScrollState,
) {
    let block = pane_block(" Heap ", is_focused);
    let content_width = area.width.saturating_sub(2) as usize;
    let mut all_items = Vec::new();

    if objects.is_empty() {
        all_items.push(
            ListItem::new("(no heap objects)").style(Style::default().fg(DEFAULT_THEME.comment)),
        );
    }

    let heap = Heap::new();
    for object in objects {
        let mut header = vec![
            Span::styled(
                format!("#{}", object.id),
                Style::default()
                    .fg(DEFAULT_THEME.reference)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" | ", Style::default().fg(DEFAULT_THEME.comment)),
            Span::styled(object.kind.to_string(), Style::default().fg(DEFAULT_THEME.keyword)),
        ];
        if let Some(label) = &object.label {
            header.push(Span::styled(
                format!(" ({label})"),
                Style::default().fg(DEFAULT_THEME.type_name),
            ));
        }
        header.push(Span::styled(
            format!("  ← {}", object.references.join(", ")),
            Style::default().fg(DEFAULT_THEME.comment),
        ));
        all_items.push(ListItem::new(Line::from(header)));

        // Wrap long payloads under the header
        let text = display_value(&object.value, &heap, language);
        let wrap = content_width.saturating_sub(4).max(8);
        let chars: Vec<char> = text.chars().collect();
        for chunk in chars.chunks(wrap) {
            all_items.push(ListItem::new(Line::from(vec![
                Span::raw("    "),
                Span::styled(
                    chunk.iter().collect::<String>(),
                    Style::default().fg(DEFAULT_THEME.fg),
                ),
            ])));
        }
    }

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
