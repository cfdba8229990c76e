//! Global variables pane

use super::utils::{clamp_scroll, pane_block, variable_line};
use crate::memory::Variable;
use crate::parser::Language;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{List, ListItem},
    Frame,
};

/// Render the global variables of the current step
pub fn render_variables_pane(
    frame: &mut Frame,
    area: Rect,
    variables: &[Variable],
    language: Language,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Variables ", is_focused);

    let items: Vec<ListItem> = if variables.is_empty() {
        vec![ListItem::new("(no globals)").style(Style::default().fg(DEFAULT_THEME.comment))]
    } else {
        variables
            .iter()
            .map(|var| ListItem::new(variable_line(var, language, 1)))
            .collect()
    };

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    clamp_scroll(scroll_offset, items.len(), visible_height);

    let visible: Vec<ListItem> = items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();
    frame.render_widget(List::new(visible).block(block), area);
}
