//! Helpers shared by the panes

use crate::interpreter::display_value;
use crate::memory::{Heap, Value, Variable};
use crate::parser::Language;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
};

/// Bordered block with the focus highlight
pub(super) fn pane_block(title: &str, is_focused: bool) -> Block<'_> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Clamp a scroll offset so the last page stays full
pub(super) fn clamp_scroll(offset: &mut usize, total_items: usize, visible_height: usize) {
    if total_items > visible_height {
        *offset = (*offset).min(total_items - visible_height);
    } else {
        *offset = 0;
    }
}

/// Styled text of a value; heap references show as `@id`
pub(super) fn value_span(value: &Value, language: Language) -> Span<'static> {
    // An empty heap keeps references symbolic
    let text = display_value(value, &Heap::new(), language);
    let color = match value {
        Value::Int(_) | Value::Float(_) | Value::Bool(_) => DEFAULT_THEME.number,
        Value::Str(_) | Value::Char(_) => DEFAULT_THEME.string,
        Value::HeapRef(_) => DEFAULT_THEME.reference,
        Value::Raw(_) | Value::Null => DEFAULT_THEME.comment,
        Value::List(_) | Value::Object(_) => DEFAULT_THEME.fg,
    };
    let text = match value {
        Value::Str(s) => format!("\"{s}\""),
        Value::Char(c) => format!("'{c}'"),
        _ => text,
    };
    Span::styled(text, Style::default().fg(color))
}

/// `  name: type = value`
pub(super) fn variable_line(var: &Variable, language: Language, indent: usize) -> Line<'static> {
    Line::from(vec![
        Span::raw(" ".repeat(indent)),
        Span::styled(var.name.clone(), Style::default().fg(DEFAULT_THEME.fg)),
        Span::styled(": ", Style::default().fg(DEFAULT_THEME.comment)),
        Span::styled(
            var.type_name.clone(),
            Style::default().fg(DEFAULT_THEME.type_name),
        ),
        Span::styled(" = ", Style::default().fg(DEFAULT_THEME.comment)),
        value_span(&var.value, language),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_scroll() {
        let mut offset = 50;
        clamp_scroll(&mut offset, 20, 5);
        assert_eq!(offset, 15);
        clamp_scroll(&mut offset, 3, 5);
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_value_span_keeps_references_symbolic() {
        let span = value_span(&Value::HeapRef(3), Language::Python);
        assert_eq!(span.content, "@3");
        let span = value_span(&Value::Str("Ada".into()), Language::Java);
        assert_eq!(span.content, "\"Ada\"");
    }
}
